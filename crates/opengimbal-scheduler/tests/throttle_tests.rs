//! Unit tests for the per-client request throttle, run as an integration
//! test target so `MockAdc` and the scheduler resolve to the same build of
//! this crate.

#![allow(clippy::unwrap_used)]

use opengimbal_scheduler::{
    AdcRequest, AdcScheduler, ClientId, EnqueueError, RequestError, RequestThrottle,
};
use opengimbal_test_helpers::MockAdc;

fn fixture() -> (AdcScheduler<MockAdc>, RequestThrottle, AdcRequest) {
    (
        AdcScheduler::new(MockAdc::new()),
        RequestThrottle::default(),
        AdcRequest::new(ClientId(0), 4),
    )
}

fn finish_one(scheduler: &AdcScheduler<MockAdc>, throttle: &RequestThrottle) {
    scheduler.hardware().finish();
    scheduler.complete_conversion();
    throttle.on_completion();
}

#[test]
fn test_throttle_latches_at_cap() {
    let (scheduler, throttle, request) = fixture();

    throttle.request_conversion(&scheduler, request).unwrap();
    throttle.request_conversion(&scheduler, request).unwrap();
    throttle.request_conversion(&scheduler, request).unwrap();
    assert!(throttle.is_full());
    assert_eq!(throttle.outstanding(), 3);

    assert_eq!(
        throttle.request_conversion(&scheduler, request),
        Err(RequestError::ThrottleSaturated)
    );
    // The drop was local: the scheduler never saw a fourth request.
    assert_eq!(scheduler.pending(), 3);
}

#[test]
fn test_completion_reopens_only_below_cap() {
    let (scheduler, throttle, request) = fixture();
    for _ in 0..3 {
        throttle.request_conversion(&scheduler, request).unwrap();
    }

    finish_one(&scheduler, &throttle);
    assert_eq!(throttle.outstanding(), 2);
    assert!(!throttle.is_full());

    // Refill to the cap: latches again.
    throttle.request_conversion(&scheduler, request).unwrap();
    assert!(throttle.is_full());
}

#[test]
fn test_quota_cannot_be_exceeded_by_single_completion() {
    // One completion against a saturated throttle frees exactly one
    // slot, not the whole quota.
    let (scheduler, throttle, request) = fixture();
    for _ in 0..3 {
        throttle.request_conversion(&scheduler, request).unwrap();
    }
    finish_one(&scheduler, &throttle);

    throttle.request_conversion(&scheduler, request).unwrap();
    assert_eq!(
        throttle.request_conversion(&scheduler, request),
        Err(RequestError::ThrottleSaturated)
    );
    assert_eq!(throttle.outstanding(), 3);
}

#[test]
fn test_scheduler_rejection_costs_nothing() {
    let scheduler = AdcScheduler::new(MockAdc::new());
    let throttle = RequestThrottle::new(8);
    let hog = RequestThrottle::new(8);

    // Another client fills the shared queue.
    for _ in 0..8 {
        hog.request_conversion(&scheduler, AdcRequest::new(ClientId(1), 2))
            .unwrap();
    }

    let request = AdcRequest::new(ClientId(0), 4);
    assert_eq!(
        throttle.request_conversion(&scheduler, request),
        Err(RequestError::Scheduler(EnqueueError::QueueFull))
    );
    assert_eq!(throttle.outstanding(), 0);
    assert!(!throttle.is_full());
}

#[test]
fn test_retract_reconciles_with_in_flight_entry() {
    let (scheduler, throttle, request) = fixture();
    for _ in 0..3 {
        throttle.request_conversion(&scheduler, request).unwrap();
    }

    // Head entry is converting: only two come back.
    throttle.retract(&scheduler, request.client);
    assert_eq!(throttle.outstanding(), 1);
    assert!(!throttle.is_full());

    // The in-flight completion still balances the books.
    finish_one(&scheduler, &throttle);
    assert_eq!(throttle.outstanding(), 0);
}

#[test]
fn test_retract_without_queued_entries_is_noop() {
    let (scheduler, throttle, request) = fixture();
    throttle.retract(&scheduler, request.client);
    assert_eq!(throttle.outstanding(), 0);
}

#[test]
fn test_retract_racing_completion_conserves_count() {
    // Every request must be subtracted exactly once, as a retraction or
    // as a completion, no matter how the interrupt interleaves with the
    // main loop's retract.
    for _ in 0..200 {
        let scheduler = AdcScheduler::new(MockAdc::new());
        let throttle = RequestThrottle::new(8);
        let request = AdcRequest::new(ClientId(0), 4);
        for _ in 0..4 {
            throttle.request_conversion(&scheduler, request).unwrap();
        }

        std::thread::scope(|s| {
            // Completion-handler context: the armed head finishes while
            // the main loop is retracting the rest.
            let handler = s.spawn(|| {
                scheduler.hardware().finish();
                scheduler.complete_conversion();
                throttle.on_completion();
            });
            throttle.retract(&scheduler, request.client);
            handler.join().expect("completion handler thread");
        });

        // Drain whatever survived the retraction.
        while scheduler.pending() > 0 && scheduler.is_armed() {
            scheduler.hardware().finish();
            let owner = scheduler.current_client();
            scheduler.complete_conversion();
            if owner.is_some() {
                throttle.on_completion();
            }
        }
        assert_eq!(throttle.outstanding(), 0);
        assert!(!throttle.is_full());
    }
}

#[test]
fn test_set_max_outstanding_rederives_latch() {
    let (scheduler, throttle, request) = fixture();
    throttle.request_conversion(&scheduler, request).unwrap();
    throttle.request_conversion(&scheduler, request).unwrap();

    throttle.set_max_outstanding(2);
    assert!(throttle.is_full());

    throttle.set_max_outstanding(5);
    assert!(!throttle.is_full());
    assert_eq!(throttle.max_outstanding(), 5);
}
