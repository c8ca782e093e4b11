//! Linear range remapping stage.
//!
//! Maps an input range `[in_min, in_max]` linearly onto an output range
//! `[out_min, out_max]`, optionally reversing the direction of travel first.
//! This is the calibration workhorse: it turns raw 10-bit ADC counts into
//! whatever unit the consumer wants (servo microseconds, percent, one byte).

use crate::error::{StageError, StageResult};

/// Linear range remapping stage.
///
/// The remap multiplies before it divides: the intermediate product is
/// computed in `i32` because `(input - in_min) * (out_max - out_min)` can
/// exceed 16 bits for full-scale ADC inputs. Dividing first would truncate
/// small inputs to zero.
///
/// # Example
///
/// ```
/// use opengimbal_stages::LinearMap;
///
/// let map = LinearMap::new(0, 1023, 0, 255)?;
/// assert_eq!(map.compute(0), 0);
/// assert_eq!(map.compute(1023), 255);
/// assert_eq!(map.compute(512), 127);
/// # Ok::<(), opengimbal_stages::StageError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearMap {
    in_min: i16,
    in_max: i16,
    out_min: i16,
    out_max: i16,
    reversed: bool,
    bypassed: bool,
    changed: bool,
}

impl LinearMap {
    /// Creates a linear map over the given input and output ranges.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::DegenerateRange`] when `in_min == in_max`,
    /// which would divide by zero during remapping.
    pub fn new(in_min: i16, in_max: i16, out_min: i16, out_max: i16) -> StageResult<Self> {
        if in_min == in_max {
            return Err(StageError::DegenerateRange(in_min));
        }
        Ok(Self {
            in_min,
            in_max,
            out_min,
            out_max,
            reversed: false,
            bypassed: false,
            changed: true,
        })
    }

    /// Enables direction reversal (builder form).
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    /// Remaps one input sample.
    pub fn compute(&self, input: i16) -> i16 {
        let input = if self.reversed {
            // Mirror the input inside its own range before remapping. Widened
            // first: the sum of bounds near the i16 extremes overflows.
            i32::from(self.in_max) + i32::from(self.in_min) - i32::from(input)
        } else {
            i32::from(input)
        };

        // Multiply first, in i32: full-scale input times a few hundred counts
        // of output delta overflows 16 bits.
        let mut intermediate = (input - i32::from(self.in_min))
            * (i32::from(self.out_max) - i32::from(self.out_min));
        intermediate /= i32::from(self.in_max) - i32::from(self.in_min);
        intermediate += i32::from(self.out_min);
        intermediate as i16
    }

    /// Reconfigures the input and output ranges.
    ///
    /// Marks the stage changed only for parameters that actually differ, so
    /// a no-op reconfiguration does not invalidate the pipeline memo.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::DegenerateRange`] when `in_min == in_max`; the
    /// previous ranges are kept in that case.
    pub fn set_ranges(
        &mut self,
        in_min: i16,
        in_max: i16,
        out_min: i16,
        out_max: i16,
    ) -> StageResult {
        if in_min == in_max {
            return Err(StageError::DegenerateRange(in_min));
        }
        if self.in_min != in_min {
            self.in_min = in_min;
            self.changed = true;
        }
        if self.in_max != in_max {
            self.in_max = in_max;
            self.changed = true;
        }
        if self.out_min != out_min {
            self.out_min = out_min;
            self.changed = true;
        }
        if self.out_max != out_max {
            self.out_max = out_max;
            self.changed = true;
        }
        Ok(())
    }

    /// Sets or clears direction reversal.
    pub fn set_reversed(&mut self, reversed: bool) {
        if self.reversed != reversed {
            self.changed = true;
        }
        self.reversed = reversed;
    }

    /// Returns true when direction reversal is active.
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Input range lower bound.
    pub fn in_min(&self) -> i16 {
        self.in_min
    }

    /// Input range upper bound.
    pub fn in_max(&self) -> i16 {
        self.in_max
    }

    /// Output range lower bound.
    pub fn out_min(&self) -> i16 {
        self.out_min
    }

    /// Output range upper bound.
    pub fn out_max(&self) -> i16 {
        self.out_max
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

impl Default for LinearMap {
    /// Full 10-bit ADC input mapped onto one byte of travel.
    fn default() -> Self {
        Self {
            in_min: 0,
            in_max: crate::ADC_FULL_SCALE,
            out_min: 0,
            out_max: crate::DEFAULT_OUTPUT_MAX,
            reversed: false,
            bypassed: false,
            changed: true,
        }
    }
}
