//! Analog Sensor Clients for OpenGimbal
//!
//! An [`AnalogSensor`] is one logical consumer of the shared ADC: a
//! potentiometer or a joystick axis. It owns a transform pipeline, a
//! per-client request throttle and a raw-result buffer, and splits its work
//! across the two execution contexts:
//!
//! - **main loop**: issue throttled conversion requests, re-evaluate the
//!   pipeline when a fresh raw value landed, hand out the calibrated reading
//! - **completion handler**: attribute the finished conversion via
//!   [`dispatch::handle_completion`] and store the raw result
//!
//! # Example
//!
//! ```
//! use opengimbal_scheduler::{AdcScheduler, ClientId};
//! use opengimbal_sensor::{dispatch, AnalogSensor};
//! use opengimbal_test_helpers::MockAdc;
//!
//! let scheduler = AdcScheduler::new(MockAdc::new());
//! let mut sensors = [AnalogSensor::new(ClientId(0), 3)];
//!
//! // Main loop: ask for a sample.
//! sensors[0].request_conversion(&scheduler)?;
//!
//! // Hardware finishes; the completion interrupt fires.
//! scheduler.hardware().set_result(900);
//! scheduler.hardware().finish();
//! dispatch::handle_completion(&scheduler, &sensors);
//!
//! // Main loop: fold the raw result through the pipeline.
//! assert!(sensors[0].update());
//! assert_eq!(sensors[0].read(), 74); // 900 averaged over 3 then scaled to a byte
//! # Ok::<(), opengimbal_scheduler::RequestError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod dispatch;
pub mod sensor;

pub use sensor::AnalogSensor;

pub use opengimbal_scheduler::ClientId;
