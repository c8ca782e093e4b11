//! Memoizing Transform Pipeline for OpenGimbal Sensors
//!
//! This crate chains up to [`PIPELINE_CAPACITY`] transform stages and
//! evaluates them in insertion order, memoizing the value seen at each stage
//! boundary. When a sampled input is steady between polls — the common case
//! for a resting joystick — evaluation short-circuits and returns the
//! memoized final output without re-running any stage, which matters on a
//! processor with cycles to spare for exactly nothing.
//!
//! The short-circuit is defeated by:
//! - a stage reporting a configuration change since the last evaluation
//! - an inherently stateful stage (the moving-average filter) at the point
//!   of comparison, whose output evolves even for a repeated input
//!
//! # ISR Safety
//!
//! Evaluation is synchronous and allocation-free:
//! - No heap allocations; the stage array is fixed capacity
//! - O(n) time in the stage count, n ≤ 5
//! - No suspension points; safe in main-loop or completion-handler context
//!
//! # Example
//!
//! ```
//! use opengimbal_pipeline::TransformPipeline;
//! use opengimbal_stages::{LinearMap, MovingAverage};
//!
//! let mut pipeline = TransformPipeline::new();
//! pipeline.add_stage(MovingAverage::new().into());
//! pipeline.add_stage(LinearMap::new(0, 1023, 0, 255)?.into());
//!
//! // The filter slews toward the input; the map scales it to one byte.
//! let out = pipeline.evaluate(900);
//! assert_eq!(out, 74); // (900 / 3) scaled by 255/1023
//! # Ok::<(), opengimbal_stages::StageError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod pipeline;

pub use pipeline::{TransformPipeline, PIPELINE_CAPACITY};

pub use opengimbal_stages::{Stage, StageKind};
