//! Completion-interrupt glue between the scheduler and its sensor clients.

use opengimbal_scheduler::{AdcHardware, AdcScheduler, ClientId};
use tracing::{trace, warn};

use crate::sensor::AnalogSensor;

/// Routes a finished conversion to the sensor that asked for it.
///
/// Call from the ADC completion handler, once per completion interrupt.
/// Attribution is read from the queue head *before* the entry is retired,
/// then the raw result is delivered to the matching sensor's buffer. The
/// heavy pipeline work stays out of this context; the sensor only latches
/// the value.
///
/// Returns the client the result was attributed to, or `None` for a
/// spurious completion or a tombstoned head entry (the entry is still
/// retired so the queue keeps moving).
pub fn handle_completion<H: AdcHardware>(
    scheduler: &AdcScheduler<H>,
    sensors: &[AnalogSensor],
) -> Option<ClientId> {
    let owner = scheduler.current_client();
    let raw = scheduler.hardware().read_result();
    scheduler.complete_conversion();

    let request = owner?;
    let Some(sensor) = sensors.iter().find(|s| s.id() == request.client) else {
        // A client retracted after its conversion was armed, or an id with
        // no registered sensor. The queue entry is already retired.
        warn!(client = request.client.0, "completion for unknown client");
        return None;
    };
    sensor.complete(raw);
    trace!(client = request.client.0, raw, "completion dispatched");
    Some(request.client)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use opengimbal_test_helpers::MockAdc;

    fn rig() -> (AdcScheduler<MockAdc>, [AnalogSensor; 2]) {
        let scheduler = AdcScheduler::new(MockAdc::new());
        let sensors = [
            AnalogSensor::new(ClientId(0), 3),
            AnalogSensor::new(ClientId(1), 5),
        ];
        (scheduler, sensors)
    }

    #[test]
    fn test_completion_routed_to_owner() {
        let (scheduler, sensors) = rig();
        sensors[0].request_conversion(&scheduler).unwrap();
        sensors[1].request_conversion(&scheduler).unwrap();

        scheduler.hardware().set_result(600);
        scheduler.hardware().finish();
        assert_eq!(handle_completion(&scheduler, &sensors), Some(ClientId(0)));
        assert_eq!(sensors[0].raw(), 600);
        assert_eq!(sensors[1].raw(), 0);

        scheduler.hardware().set_result(300);
        scheduler.hardware().finish();
        assert_eq!(handle_completion(&scheduler, &sensors), Some(ClientId(1)));
        assert_eq!(sensors[1].raw(), 300);
    }

    #[test]
    fn test_spurious_completion_returns_none() {
        let (scheduler, sensors) = rig();
        assert_eq!(handle_completion(&scheduler, &sensors), None);
        assert_eq!(sensors[0].raw(), 0);
    }

    #[test]
    fn test_unknown_client_still_retires_entry() {
        let (scheduler, sensors) = rig();
        sensors[0].request_conversion(&scheduler).unwrap();
        // A second client enqueues directly, then disappears.
        scheduler
            .enqueue(opengimbal_scheduler::AdcRequest::new(ClientId(9), 7))
            .unwrap();

        scheduler.hardware().finish();
        handle_completion(&scheduler, &sensors);

        scheduler.hardware().finish();
        assert_eq!(handle_completion(&scheduler, &sensors), None);
        assert_eq!(scheduler.pending(), 0);
    }
}
