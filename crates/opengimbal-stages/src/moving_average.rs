//! Sliding-window average filter stage.

/// Number of samples in the sliding window.
pub const FILTER_WINDOW: usize = 3;

/// Sliding-window average filter.
///
/// Keeps the last [`FILTER_WINDOW`] samples in a circular buffer with a
/// running sum, so each call is O(1): subtract the evicted sample, add the
/// new one, divide. Integer division truncates toward zero, biasing the
/// output low by at most one count.
///
/// Unlike the other stages this one is inherently stateful: its output
/// evolves even when the input repeats, so the pipeline must never
/// short-circuit around it.
///
/// # Example
///
/// ```
/// use opengimbal_stages::MovingAverage;
///
/// let mut filter = MovingAverage::new();
/// assert_eq!(filter.compute(9), 3);
/// assert_eq!(filter.compute(9), 6);
/// assert_eq!(filter.compute(9), 9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingAverage {
    samples: [i16; FILTER_WINDOW],
    sum: i32,
    cursor: usize,
    bypassed: bool,
    changed: bool,
}

impl MovingAverage {
    /// Creates a filter pre-charged with zeros.
    pub fn new() -> Self {
        Self::pre_charged(0)
    }

    /// Creates a filter pre-charged at `level`.
    ///
    /// The window starts full of `level`, so the output does not slew up from
    /// zero when the sensor rests away from zero at startup.
    pub fn pre_charged(level: i16) -> Self {
        Self {
            samples: [level; FILTER_WINDOW],
            sum: i32::from(level) * FILTER_WINDOW as i32,
            cursor: 0,
            bypassed: false,
            changed: true,
        }
    }

    /// Feeds one sample and returns the current window average.
    pub fn compute(&mut self, input: i16) -> i16 {
        self.sum += i32::from(input) - i32::from(self.samples[self.cursor]);
        self.samples[self.cursor] = input;
        self.cursor = (self.cursor + 1) % FILTER_WINDOW;
        (self.sum / FILTER_WINDOW as i32) as i16
    }

    /// Refills the window with `level` and resets the running sum.
    pub fn reset(&mut self, level: i16) {
        self.samples = [level; FILTER_WINDOW];
        self.sum = i32::from(level) * FILTER_WINDOW as i32;
        self.cursor = 0;
    }

    /// Current window average without feeding a sample.
    pub fn output(&self) -> i16 {
        (self.sum / FILTER_WINDOW as i32) as i16
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

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new()
    }
}
