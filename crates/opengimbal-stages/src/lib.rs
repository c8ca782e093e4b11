//! Transform Stages for the OpenGimbal Sensor Pipeline
//!
//! This crate provides the closed set of signal-transform stages applied to
//! raw ADC readings before they become calibrated sensor values:
//!
//! - **LinearMap**: linear remapping between an input and an output range,
//!   with optional direction reversal
//! - **Deadzone**: collapses a sub-range of the input to a constant neutral
//!   output
//! - **MovingAverage**: fixed-window sliding average for noise suppression
//!
//! Every stage carries a bypass flag (pass the input through untouched) and a
//! changed flag (a parameter was modified since the pipeline last observed
//! it). The pipeline uses the changed flag to invalidate its memoized output.
//!
//! The variant set is fixed at design time, so dispatch goes through the
//! [`Stage`] enum rather than trait objects.
//!
//! # ISR Safety
//!
//! All stage computations are synchronous and allocation-free:
//! - No heap allocations anywhere
//! - O(1) time complexity per `compute` call
//! - Safe to run from a completion-interrupt context
//!
//! # Example
//!
//! ```
//! use opengimbal_stages::{LinearMap, Stage};
//!
//! // Map the 10-bit ADC range onto one byte
//! let map = LinearMap::new(0, 1023, 0, 255)?;
//! let mut stage = Stage::from(map);
//!
//! assert_eq!(stage.compute(512), 127);
//! # Ok::<(), opengimbal_stages::StageError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod deadzone;
pub mod error;
pub mod linear_map;
pub mod moving_average;
pub mod stage;

pub use deadzone::Deadzone;
pub use error::{StageError, StageResult};
pub use linear_map::LinearMap;
pub use moving_average::{MovingAverage, FILTER_WINDOW};
pub use stage::{Stage, StageKind};

/// Full-scale raw value of the 10-bit ADC.
pub const ADC_FULL_SCALE: i16 = 1023;

/// Default output-range maximum (one byte of travel).
pub const DEFAULT_OUTPUT_MAX: i16 = 255;
