//! Per-client cap on outstanding conversion requests.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::error::{RequestError, RequestResult};
use crate::hal::AdcHardware;
use crate::scheduler::{AdcRequest, AdcScheduler, ClientId};

/// Default cap on a client's outstanding requests.
pub const DEFAULT_MAX_OUTSTANDING: u8 = 3;

/// Caps how many requests one client may have sitting in the scheduler.
///
/// A greedy client polling faster than the ADC drains would otherwise crowd
/// everyone else out of the shared queue. The throttle counts the client's
/// outstanding requests and latches a local full flag at the configured
/// maximum; while latched, requests are dropped locally without touching the
/// scheduler.
///
/// The outstanding count is incremented from the main loop and decremented
/// from the completion handler, so both fields are byte atomics.
#[derive(Debug)]
pub struct RequestThrottle {
    max_outstanding: AtomicU8,
    outstanding: AtomicU8,
    full: AtomicBool,
}

impl RequestThrottle {
    /// Creates a throttle admitting up to `max_outstanding` requests.
    pub fn new(max_outstanding: u8) -> Self {
        Self {
            max_outstanding: AtomicU8::new(max_outstanding),
            outstanding: AtomicU8::new(0),
            full: AtomicBool::new(false),
        }
    }

    /// Submits a conversion request for `request.client` unless throttled.
    ///
    /// The outstanding count only grows when the scheduler actually accepted
    /// the request; a queue-full rejection costs the client nothing.
    ///
    /// # Errors
    ///
    /// [`RequestError::ThrottleSaturated`] when the local cap is latched,
    /// [`RequestError::Scheduler`] when the shared queue rejected.
    pub fn request_conversion<H: AdcHardware>(
        &self,
        scheduler: &AdcScheduler<H>,
        request: AdcRequest,
    ) -> RequestResult {
        if self.full.load(Ordering::Acquire) {
            return Err(RequestError::ThrottleSaturated);
        }
        scheduler.enqueue(request)?;

        let outstanding = self.outstanding.fetch_add(1, Ordering::AcqRel) + 1;
        if outstanding >= self.max_outstanding.load(Ordering::Relaxed) {
            self.full.store(true, Ordering::Release);
        }
        Ok(())
    }

    /// Records one finished conversion. Completion-handler context.
    ///
    /// The full flag releases only once the count is back under the cap; a
    /// single completion against several outstanding requests must not
    /// reopen the gate early.
    pub fn on_completion(&self) {
        if self.outstanding.load(Ordering::Acquire) == 0 {
            return;
        }
        let outstanding = self.outstanding.fetch_sub(1, Ordering::AcqRel) - 1;
        if outstanding < self.max_outstanding.load(Ordering::Relaxed) {
            self.full.store(false, Ordering::Release);
        }
    }

    /// Withdraws the client's queued requests from the scheduler.
    ///
    /// Only what the scheduler actually removed is subtracted — an entry
    /// already converting stays counted until its completion arrives.
    pub fn retract<H: AdcHardware>(&self, scheduler: &AdcScheduler<H>, client: ClientId) {
        let removed = scheduler.retract_all(client);
        if removed == 0 {
            return;
        }
        // The completion handler decrements this count concurrently; the
        // subtraction must be a single RMW or an interleaved decrement would
        // be overwritten and the quota lost for good.
        let previous = self
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                Some(count.saturating_sub(removed))
            });
        let outstanding = match previous {
            Ok(count) | Err(count) => count.saturating_sub(removed),
        };
        if outstanding < self.max_outstanding.load(Ordering::Relaxed) {
            self.full.store(false, Ordering::Release);
        }
    }

    /// Reconfigures the cap, re-deriving the full flag from the current
    /// count.
    pub fn set_max_outstanding(&self, max: u8) {
        self.max_outstanding.store(max, Ordering::Relaxed);
        let saturated = self.outstanding.load(Ordering::Acquire) >= max;
        self.full.store(saturated, Ordering::Release);
    }

    /// The configured cap.
    pub fn max_outstanding(&self) -> u8 {
        self.max_outstanding.load(Ordering::Relaxed)
    }

    /// Requests currently awaiting completion.
    pub fn outstanding(&self) -> u8 {
        self.outstanding.load(Ordering::Acquire)
    }

    /// True while the local cap is latched.
    pub fn is_full(&self) -> bool {
        self.full.load(Ordering::Acquire)
    }
}

impl Default for RequestThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OUTSTANDING)
    }
}
