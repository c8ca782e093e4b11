//! Property-based tests for the full request/complete/update loop.

use opengimbal_scheduler::{AdcScheduler, ClientId};
use opengimbal_sensor::{dispatch, AnalogSensor};
use opengimbal_test_helpers::MockAdc;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // --- Calibrated readings stay on the output range ---

    #[test]
    fn reading_bounded_by_output_range(raws in prop::collection::vec(0u16..=1023, 1..40)) {
        let scheduler = AdcScheduler::new(MockAdc::new());
        let mut sensor = AnalogSensor::new(ClientId(0), 1).with_max_outstanding(1);

        for raw in raws {
            sensor.request_conversion(&scheduler).expect("cap is 1, queue is empty");
            scheduler.hardware().set_result(raw);
            scheduler.hardware().finish();
            dispatch::handle_completion(&scheduler, core::slice::from_ref(&sensor));

            prop_assert!(sensor.update());
            prop_assert!((0..=255).contains(&sensor.read()));
        }
    }

    // --- Every completion lands on the sensor that asked ---

    #[test]
    fn completions_route_to_requester(order in prop::collection::vec(0usize..3, 1..24)) {
        let scheduler = AdcScheduler::new(MockAdc::new());
        let sensors = [
            AnalogSensor::new(ClientId(0), 0),
            AnalogSensor::new(ClientId(1), 1),
            AnalogSensor::new(ClientId(2), 2),
        ];

        for &which in &order {
            // Scripted raw value identifies the channel it was read from.
            let raw = 100 * (which as u16 + 1);
            sensors[which]
                .request_conversion(&scheduler)
                .expect("lockstep completion keeps throttle and queue open");
            scheduler.hardware().set_result(raw);
            scheduler.hardware().finish();
            let owner = dispatch::handle_completion(&scheduler, &sensors);
            prop_assert_eq!(owner, Some(ClientId(which as u8)));
            prop_assert_eq!(sensors[which].raw(), raw);
        }
    }

    // --- The throttle caps a greedy sensor without starving it ---

    #[test]
    fn outstanding_never_exceeds_cap(cap in 1u8..6, attempts in 1usize..40) {
        let scheduler = AdcScheduler::new(MockAdc::new());
        let sensor = AnalogSensor::new(ClientId(0), 1);
        sensor.set_max_outstanding(cap);

        let mut accepted = 0u32;
        for i in 0..attempts {
            if sensor.request_conversion(&scheduler).is_ok() {
                accepted += 1;
            }
            prop_assert!(sensor.throttle().outstanding() <= cap);

            // Drain one conversion every third iteration.
            if i % 3 == 2 && scheduler.is_armed() {
                scheduler.hardware().finish();
                dispatch::handle_completion(&scheduler, core::slice::from_ref(&sensor));
            }
        }
        prop_assert!(accepted >= 1);
    }
}

#[test]
fn scenario_joystick_axis_settles() {
    // A joystick axis: request, complete, update each loop iteration. After
    // the filter window fills, the stick at rest reads its mapped center.
    let scheduler = AdcScheduler::new(MockAdc::new());
    let mut sensor = AnalogSensor::new(ClientId(0), 2).with_max_outstanding(1);
    sensor.set_deadzone(500, 524, 512);

    for _ in 0..3 {
        sensor.request_conversion(&scheduler).expect("queue empty each iteration");
        scheduler.hardware().set_result(508);
        scheduler.hardware().finish();
        dispatch::handle_completion(&scheduler, core::slice::from_ref(&sensor));
        assert!(sensor.update());
    }

    // Filtered 508 sits inside the zone and collapses to the neutral 512.
    assert_eq!(sensor.read(), 127);

    // A hard push leaves the zone on the next window.
    for _ in 0..3 {
        sensor.request_conversion(&scheduler).expect("queue empty each iteration");
        scheduler.hardware().set_result(1000);
        scheduler.hardware().finish();
        dispatch::handle_completion(&scheduler, core::slice::from_ref(&sensor));
        sensor.update();
    }
    assert_eq!(sensor.read(), 249);
}

#[test]
fn scenario_retract_on_mode_switch() {
    // Switching input modes retracts the old sensor's queued requests and
    // reuses the freed slots immediately.
    let scheduler = AdcScheduler::new(MockAdc::new());
    let old = AnalogSensor::new(ClientId(0), 1).with_max_outstanding(8);
    let new = AnalogSensor::new(ClientId(1), 2).with_max_outstanding(8);

    for _ in 0..8 {
        old.request_conversion(&scheduler).expect("queue has room");
    }
    assert!(new.request_conversion(&scheduler).is_err());

    old.retract(&scheduler);
    // The armed head entry survives; its completion reclaims the tombstones.
    assert_eq!(old.throttle().outstanding(), 1);
    scheduler.hardware().finish();
    dispatch::handle_completion(&scheduler, core::slice::from_ref(&old));
    assert_eq!(scheduler.pending(), 0);

    new.request_conversion(&scheduler).expect("queue drained");
    scheduler.hardware().set_result(333);
    scheduler.hardware().finish();
    assert_eq!(
        dispatch::handle_completion(&scheduler, core::slice::from_ref(&new)),
        Some(ClientId(1))
    );
    assert_eq!(new.raw(), 333);
}
