//! Error types for request admission.
//!
//! These errors cross the main-loop/interrupt boundary, so they are
//! fieldless `Copy` enums with no allocation behind them.

use thiserror::Error;

/// Scheduler admission failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueError {
    /// The request queue already holds its full capacity of entries. The
    /// request was dropped; re-issue it on a later loop iteration.
    #[error("ADC request queue is full")]
    QueueFull,
}

/// A specialized `Result` for scheduler admission.
pub type EnqueueResult = Result<(), EnqueueError>;

/// Failure of a throttled conversion request.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    /// The client already has its configured maximum of outstanding
    /// requests; nothing was submitted to the scheduler.
    #[error("client throttle is saturated")]
    ThrottleSaturated,

    /// The scheduler rejected the request.
    #[error(transparent)]
    Scheduler(#[from] EnqueueError),
}

/// A specialized `Result` for throttled requests.
pub type RequestResult = Result<(), RequestError>;
