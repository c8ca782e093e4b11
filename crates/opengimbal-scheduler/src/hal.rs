//! Hardware abstraction for the single ADC peripheral.

/// The platform's ADC peripheral, as seen by the scheduler.
///
/// The platform layer owns pin wiring, clocking and register layout; the
/// scheduler only needs to select a channel, trigger a conversion, poll the
/// busy flag and read back the finished sample. The completion notification
/// itself arrives out of band as an interrupt carrying no payload — the
/// handler asks the scheduler which client the result belongs to.
///
/// Methods take `&self` because the peripheral is shared between the main
/// loop and the completion handler; implementations are expected to be
/// register-backed (or atomics-backed, for test doubles).
pub trait AdcHardware {
    /// Programs the channel multiplexer and starts a conversion.
    ///
    /// Only called when [`is_busy`](Self::is_busy) reported idle; starting
    /// while busy is a contract violation by the scheduler, not something
    /// implementations need to defend against.
    fn start_conversion(&self, channel: u8);

    /// True while a conversion is running.
    fn is_busy(&self) -> bool;

    /// The most recent completed conversion result (10-bit, right-aligned).
    fn read_result(&self) -> u16;
}
