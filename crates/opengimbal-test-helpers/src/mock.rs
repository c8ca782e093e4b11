//! Scripted stand-in for the ADC peripheral.

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};

use opengimbal_scheduler::AdcHardware;

const NO_CHANNEL: u16 = u16::MAX;

/// Mock ADC peripheral driven explicitly by the test harness.
///
/// `start_conversion` latches the channel and raises the busy flag; the test
/// plays the role of the silicon by calling [`set_result`](Self::set_result)
/// and [`finish`](Self::finish), then invokes the scheduler's completion
/// path the way the real interrupt handler would.
///
/// All state is atomics, matching the `&self` hardware contract.
#[derive(Debug, Default)]
pub struct MockAdc {
    busy: AtomicBool,
    last_channel: AtomicU16,
    result: AtomicU16,
    conversions_started: AtomicU32,
}

impl MockAdc {
    /// Creates an idle mock with no conversions recorded.
    pub fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
            last_channel: AtomicU16::new(NO_CHANNEL),
            result: AtomicU16::new(0),
            conversions_started: AtomicU32::new(0),
        }
    }

    /// Scripts the raw value the next [`read_result`](AdcHardware::read_result)
    /// returns.
    pub fn set_result(&self, raw: u16) {
        self.result.store(raw, Ordering::Release);
    }

    /// Marks the in-flight conversion finished (busy flag drops), as the
    /// silicon does right before raising the completion interrupt.
    pub fn finish(&self) {
        self.busy.store(false, Ordering::Release);
    }

    /// Channel selected by the most recent `start_conversion`, if any.
    pub fn last_channel(&self) -> Option<u8> {
        match self.last_channel.load(Ordering::Acquire) {
            NO_CHANNEL => None,
            channel => Some(channel as u8),
        }
    }

    /// Total number of conversions started.
    pub fn conversions_started(&self) -> u32 {
        self.conversions_started.load(Ordering::Acquire)
    }
}

impl AdcHardware for MockAdc {
    fn start_conversion(&self, channel: u8) {
        self.last_channel
            .store(u16::from(channel), Ordering::Release);
        self.busy.store(true, Ordering::Release);
        self.conversions_started.fetch_add(1, Ordering::AcqRel);
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn read_result(&self) -> u16 {
        self.result.load(Ordering::Acquire)
    }
}
