//! Asynchronous ADC Request Scheduling for OpenGimbal
//!
//! A single physical analog-to-digital converter is multiplexed across many
//! logical sensor clients. Each client asks for a conversion without
//! blocking; the scheduler queues the request in a bounded circular buffer,
//! arms the hardware for the head of the queue, and the hardware's
//! completion interrupt drives the queue forward. Serialization is
//! structural: at most one conversion is ever armed, so the completion
//! handler is the only thing that retires queue entries.
//!
//! # Concurrency model
//!
//! There are exactly two execution contexts on the target:
//!
//! - the cooperative **main loop**, which enqueues and retracts requests
//! - the hardware **completion handler**, which preempts the main loop,
//!   attributes the finished result via [`AdcScheduler::current_client`] and
//!   calls [`AdcScheduler::complete_conversion`]
//!
//! All shared fields are byte-sized atomics (or a single-word slot), so the
//! handler never observes a torn multi-field update. The split is strict
//! single-producer/single-consumer: only the main loop writes the tail side,
//! only the completion handler retires the head side.
//!
//! # Admission
//!
//! `enqueue` never blocks and fails closed: a request against a full queue
//! is dropped with [`EnqueueError::QueueFull`] and must be re-issued by the
//! caller on a later loop iteration. There is no internal retry and no
//! timeout; a conversion always eventually completes via hardware signal.
//!
//! # Example
//!
//! ```
//! use opengimbal_scheduler::{AdcRequest, AdcScheduler, ClientId};
//! use opengimbal_test_helpers::MockAdc;
//!
//! let scheduler = AdcScheduler::new(MockAdc::new());
//! scheduler.enqueue(AdcRequest::new(ClientId(0), 3))?;
//!
//! // The hardware was armed for channel 3 immediately.
//! assert_eq!(scheduler.hardware().last_channel(), Some(3));
//! # Ok::<(), opengimbal_scheduler::EnqueueError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod hal;
pub mod scheduler;
pub mod throttle;

pub use error::{EnqueueError, EnqueueResult, RequestError, RequestResult};
pub use hal::AdcHardware;
pub use scheduler::{AdcRequest, AdcScheduler, ClientId, QUEUE_CAPACITY};
pub use throttle::{RequestThrottle, DEFAULT_MAX_OUTSTANDING};
