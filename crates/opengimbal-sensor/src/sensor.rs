//! One logical consumer of the shared ADC.

use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use opengimbal_pipeline::TransformPipeline;
use opengimbal_scheduler::{
    AdcHardware, AdcRequest, AdcScheduler, ClientId, RequestResult, RequestThrottle,
};
use opengimbal_stages::{Deadzone, LinearMap, MovingAverage, StageKind, StageResult};
use tracing::trace;

/// An analog sensor client: potentiometer or joystick axis.
///
/// The default pipeline is the axis assembly the firmware uses everywhere:
/// moving-average filter first (so it is never short-circuited around), then
/// deadzone (inert until configured), then the 10-bit-to-byte linear map.
/// The stage set is fixed at construction; only parameters, bypass flags and
/// the throttle cap mutate afterward.
#[derive(Debug)]
pub struct AnalogSensor {
    id: ClientId,
    channel: u8,
    throttle: RequestThrottle,
    pipeline: TransformPipeline,
    /// Raw result buffer, written from the completion handler.
    raw: AtomicU16,
    /// True when `raw` holds a result the pipeline has not seen yet.
    fresh: AtomicBool,
    value: i16,
}

impl AnalogSensor {
    /// Creates a sensor for `channel` with the default axis pipeline.
    pub fn new(id: ClientId, channel: u8) -> Self {
        let mut pipeline = TransformPipeline::new();
        pipeline.add_stage(MovingAverage::new().into());
        pipeline.add_stage(Deadzone::default().into());
        pipeline.add_stage(LinearMap::default().into());

        Self {
            id,
            channel,
            throttle: RequestThrottle::default(),
            pipeline,
            raw: AtomicU16::new(0),
            fresh: AtomicBool::new(false),
            value: 0,
        }
    }

    /// Caps the sensor's outstanding scheduler requests (builder form).
    #[must_use]
    pub fn with_max_outstanding(self, max: u8) -> Self {
        self.throttle.set_max_outstanding(max);
        self
    }

    /// The client identity used for queue attribution.
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// The hardware channel this sensor samples.
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Asks the scheduler for one conversion, subject to the throttle.
    ///
    /// Non-blocking; a rejection is final for this loop iteration and the
    /// caller simply tries again on the next one.
    ///
    /// # Errors
    ///
    /// See [`RequestThrottle::request_conversion`].
    pub fn request_conversion<H: AdcHardware>(&self, scheduler: &AdcScheduler<H>) -> RequestResult {
        self.throttle
            .request_conversion(scheduler, AdcRequest::new(self.id, self.channel))
    }

    /// Withdraws this sensor's queued requests from the scheduler.
    pub fn retract<H: AdcHardware>(&self, scheduler: &AdcScheduler<H>) {
        self.throttle.retract(scheduler, self.id);
    }

    /// Accepts a finished raw conversion. Completion-handler context.
    ///
    /// Stores the result, marks it fresh and releases one throttle slot.
    /// The pipeline is *not* run here; that happens on the next
    /// [`update`](Self::update) from the main loop.
    pub fn complete(&self, raw: u16) {
        self.raw.store(raw, Ordering::Release);
        self.fresh.store(true, Ordering::Release);
        self.throttle.on_completion();
    }

    /// Folds a fresh raw result through the pipeline, if one arrived.
    ///
    /// Returns true when the calibrated value was recomputed. Without a
    /// fresh result this is a no-op, so calling it every loop iteration
    /// costs nothing.
    pub fn update(&mut self) -> bool {
        if !self.fresh.swap(false, Ordering::AcqRel) {
            return false;
        }
        let raw = self.raw.load(Ordering::Acquire) as i16;
        self.value = self.pipeline.evaluate(raw);
        trace!(client = self.id.0, raw, value = self.value, "sensor updated");
        true
    }

    /// The calibrated reading from the most recent update.
    pub fn read(&self) -> i16 {
        self.value
    }

    /// The most recent raw conversion result.
    pub fn raw(&self) -> u16 {
        self.raw.load(Ordering::Acquire)
    }

    /// Reconfigures the linear-map ranges.
    ///
    /// # Errors
    ///
    /// [`opengimbal_stages::StageError::DegenerateRange`] when
    /// `in_min == in_max`; the previous ranges stay in effect.
    pub fn set_ranges(&mut self, in_min: i16, in_max: i16, out_min: i16, out_max: i16) -> StageResult {
        match self
            .pipeline
            .stage_of_kind_mut(StageKind::LinearMap)
            .and_then(|stage| stage.as_linear_map_mut())
        {
            Some(map) => map.set_ranges(in_min, in_max, out_min, out_max),
            None => Ok(()),
        }
    }

    /// Reconfigures the deadzone bounds and neutral output.
    pub fn set_deadzone(&mut self, zone_min: i16, zone_max: i16, neutral: i16) {
        if let Some(dz) = self
            .pipeline
            .stage_of_kind_mut(StageKind::Deadzone)
            .and_then(|stage| stage.as_deadzone_mut())
        {
            dz.set_bounds(zone_min, zone_max);
            dz.set_neutral(neutral);
        }
    }

    /// Sets or clears direction reversal on the linear map.
    pub fn set_reversed(&mut self, reversed: bool) {
        if let Some(map) = self
            .pipeline
            .stage_of_kind_mut(StageKind::LinearMap)
            .and_then(|stage| stage.as_linear_map_mut())
        {
            map.set_reversed(reversed);
        }
    }

    /// Pre-charges the moving-average filter at `level`.
    pub fn pre_charge_filter(&mut self, level: i16) {
        if let Some(filter) = self
            .pipeline
            .stage_of_kind_mut(StageKind::MovingAverage)
            .and_then(|stage| stage.as_moving_average_mut())
        {
            filter.reset(level);
        }
    }

    /// Sets the bypass flag on the first stage of the given kind.
    ///
    /// Returns `false` when the pipeline holds no such stage.
    pub fn set_bypass(&mut self, kind: StageKind, bypassed: bool) -> bool {
        self.pipeline.set_bypass(kind, bypassed)
    }

    /// Bypass flag of the first stage of the given kind, if present.
    pub fn is_bypassed(&self, kind: StageKind) -> Option<bool> {
        self.pipeline.is_bypassed(kind)
    }

    /// Reconfigures the throttle cap.
    pub fn set_max_outstanding(&self, max: u8) {
        self.throttle.set_max_outstanding(max);
    }

    /// The sensor's request throttle.
    pub fn throttle(&self) -> &RequestThrottle {
        &self.throttle
    }

    /// The sensor's transform pipeline.
    pub fn pipeline_mut(&mut self) -> &mut TransformPipeline {
        &mut self.pipeline
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_update_without_fresh_result_is_noop() {
        let mut sensor = AnalogSensor::new(ClientId(0), 2);
        assert!(!sensor.update());
        assert_eq!(sensor.read(), 0);
    }

    #[test]
    fn test_complete_then_update_runs_pipeline() {
        let mut sensor = AnalogSensor::new(ClientId(0), 2);
        sensor.complete(900);

        assert!(sensor.update());
        // 900 averaged over the 3-wide window, then scaled onto one byte.
        assert_eq!(sensor.read(), 74);

        // The raw value was consumed; update is a no-op until the next one.
        assert!(!sensor.update());
        assert_eq!(sensor.read(), 74);
    }

    #[test]
    fn test_reading_converges_on_steady_input() {
        let mut sensor = AnalogSensor::new(ClientId(0), 2);
        for _ in 0..3 {
            sensor.complete(1023);
            assert!(sensor.update());
        }
        assert_eq!(sensor.read(), 255);
    }

    #[test]
    fn test_pre_charged_filter_skips_slew() {
        let mut sensor = AnalogSensor::new(ClientId(0), 2);
        sensor.pre_charge_filter(512);
        sensor.complete(512);
        assert!(sensor.update());
        assert_eq!(sensor.read(), 127);
    }

    #[test]
    fn test_deadzone_configuration() {
        let mut sensor = AnalogSensor::new(ClientId(0), 2);
        sensor.pre_charge_filter(500);
        sensor.set_deadzone(480, 550, 512);

        sensor.complete(500);
        assert!(sensor.update());
        // Filtered 500 falls in the zone, collapses to 512, maps to 127.
        assert_eq!(sensor.read(), 127);
    }

    #[test]
    fn test_degenerate_ranges_rejected() {
        let mut sensor = AnalogSensor::new(ClientId(0), 2);
        assert!(sensor.set_ranges(3, 3, 0, 255).is_err());
        // Previous calibration still works.
        sensor.pre_charge_filter(1023);
        sensor.complete(1023);
        sensor.update();
        assert_eq!(sensor.read(), 255);
    }

    #[test]
    fn test_bypass_by_kind() {
        let mut sensor = AnalogSensor::new(ClientId(0), 2);
        assert!(sensor.set_bypass(StageKind::MovingAverage, true));
        assert!(sensor.set_bypass(StageKind::LinearMap, true));
        assert_eq!(sensor.is_bypassed(StageKind::Deadzone), Some(false));

        sensor.complete(700);
        sensor.update();
        // Everything bypassed or inert: the raw value flows straight through.
        assert_eq!(sensor.read(), 700);
    }

    #[test]
    fn test_reversed_axis() {
        let mut sensor = AnalogSensor::new(ClientId(0), 2);
        sensor.set_bypass(StageKind::MovingAverage, true);
        sensor.set_reversed(true);

        sensor.complete(0);
        sensor.update();
        assert_eq!(sensor.read(), 255);
    }
}
