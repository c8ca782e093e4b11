//! Test Helpers for OpenGimbal
//!
//! Hardware test doubles shared by the workspace's test suites. Nothing in
//! here ships to a target.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]

pub mod mock;

pub use mock::MockAdc;
