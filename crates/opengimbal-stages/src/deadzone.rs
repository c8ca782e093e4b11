//! Deadzone suppression stage.

/// Deadzone suppression stage.
///
/// Collapses every input strictly inside `(zone_min, zone_max)` to a single
/// `neutral` value; everything else passes through untouched. Used to keep a
/// joystick axis from drifting around its mechanical center.
///
/// Bounds are strict on both sides, so a zone where `zone_min == zone_max`
/// collapses nothing.
///
/// # Example
///
/// ```
/// use opengimbal_stages::Deadzone;
///
/// let dz = Deadzone::new(480, 550, 515);
/// assert_eq!(dz.compute(500), 515);
/// assert_eq!(dz.compute(479), 479);
/// assert_eq!(dz.compute(551), 551);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadzone {
    zone_min: i16,
    zone_max: i16,
    neutral: i16,
    bypassed: bool,
    changed: bool,
}

impl Deadzone {
    /// Creates a deadzone over `(zone_min, zone_max)` collapsing to `neutral`.
    pub fn new(zone_min: i16, zone_max: i16, neutral: i16) -> Self {
        Self {
            zone_min,
            zone_max,
            neutral,
            bypassed: false,
            changed: true,
        }
    }

    /// Applies the deadzone to one sample.
    pub fn compute(&self, input: i16) -> i16 {
        if input > self.zone_min && input < self.zone_max {
            self.neutral
        } else {
            input
        }
    }

    /// Reconfigures the zone boundaries.
    pub fn set_bounds(&mut self, zone_min: i16, zone_max: i16) {
        if self.zone_min != zone_min {
            self.zone_min = zone_min;
            self.changed = true;
        }
        if self.zone_max != zone_max {
            self.zone_max = zone_max;
            self.changed = true;
        }
    }

    /// Reconfigures the neutral output value.
    pub fn set_neutral(&mut self, neutral: i16) {
        if self.neutral != neutral {
            self.neutral = neutral;
            self.changed = true;
        }
    }

    /// Zone lower bound (exclusive).
    pub fn zone_min(&self) -> i16 {
        self.zone_min
    }

    /// Zone upper bound (exclusive).
    pub fn zone_max(&self) -> i16 {
        self.zone_max
    }

    /// Neutral value returned inside the zone.
    pub fn neutral(&self) -> i16 {
        self.neutral
    }

    pub(crate) fn set_bypassed(&mut self, bypassed: bool) {
        if self.bypassed != bypassed {
            self.changed = true;
        }
        self.bypassed = bypassed;
    }

    pub(crate) fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    pub(crate) fn has_changed(&self) -> bool {
        self.changed
    }

    pub(crate) fn acknowledge_change(&mut self) {
        self.changed = false;
    }
}

impl Default for Deadzone {
    /// Zero-width zone centered at ADC mid-scale: nothing is collapsed until
    /// real bounds are configured.
    fn default() -> Self {
        let mid = (crate::ADC_FULL_SCALE + 1) / 2;
        Self::new(mid, mid, mid)
    }
}
