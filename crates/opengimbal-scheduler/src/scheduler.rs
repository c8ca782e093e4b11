//! Bounded circular request queue arbitrating the shared ADC.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU16, Ordering};

use tracing::{debug, trace};

use crate::error::{EnqueueError, EnqueueResult};
use crate::hal::AdcHardware;

/// Fixed capacity of the request queue.
pub const QUEUE_CAPACITY: usize = 8;

/// Queue depth at or below which the saturation latch clears.
const SATURATION_CLEAR_DEPTH: u8 = (QUEUE_CAPACITY / 2) as u8;

/// Sentinel for an empty or tombstoned slot.
const SLOT_EMPTY: u16 = u16::MAX;

/// Identity of a logical sensor client.
///
/// Client ids are assigned at startup and stay below `u8::MAX`; the top
/// value is reserved for the empty-slot encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u8);

/// One queued conversion request: who asked, and which input line to sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcRequest {
    /// The requesting client.
    pub client: ClientId,
    /// Hardware channel/mux selector for the client's input line.
    pub channel: u8,
}

impl AdcRequest {
    /// Creates a request for `client` on `channel`.
    pub fn new(client: ClientId, channel: u8) -> Self {
        Self { client, channel }
    }

    fn encode(self) -> u16 {
        (u16::from(self.client.0) << 8) | u16::from(self.channel)
    }

    fn decode(value: u16) -> Option<Self> {
        if value == SLOT_EMPTY {
            return None;
        }
        Some(Self {
            client: ClientId((value >> 8) as u8),
            channel: (value & 0xFF) as u8,
        })
    }
}

/// Scheduler for the single shared ADC peripheral.
///
/// Requests live in a fixed ring of [`QUEUE_CAPACITY`] slots. The write
/// cursor (`tail`) belongs to the main loop; the processing cursor (`head`)
/// belongs to the completion handler. Each slot is one atomic word, so
/// publication of a request and its retirement are both single-store
/// operations.
///
/// # State machine
///
/// Idle (`pending == 0`) → Busy on the first accepted request, which also
/// arms the hardware. Busy → Full at `pending == 8`; further requests are
/// rejected. Each completion retires the head entry and re-arms for the next
/// live one; retiring the last entry returns to Idle without re-arming.
///
/// A `saturated` latch sets when the queue fills and clears once the depth
/// falls back to half capacity. It is a congestion diagnostic for clients
/// that want to back off early; admission itself is exact (rejected iff the
/// queue holds 8 entries at call time).
#[derive(Debug)]
pub struct AdcScheduler<H> {
    hw: H,
    slots: [AtomicU16; QUEUE_CAPACITY],
    /// Processing cursor: next entry to convert or retire.
    head: AtomicU8,
    /// Write cursor: next free slot.
    tail: AtomicU8,
    /// Occupied slots, tombstones included until the head passes them.
    pending: AtomicU8,
    /// Congestion latch with half-capacity hysteresis.
    saturated: AtomicBool,
    /// True from arming until the matching completion retires the entry.
    armed: AtomicBool,
}

impl<H: AdcHardware> AdcScheduler<H> {
    /// Creates an idle scheduler owning the ADC peripheral.
    pub fn new(hw: H) -> Self {
        Self {
            hw,
            slots: [const { AtomicU16::new(SLOT_EMPTY) }; QUEUE_CAPACITY],
            head: AtomicU8::new(0),
            tail: AtomicU8::new(0),
            pending: AtomicU8::new(0),
            saturated: AtomicBool::new(false),
            armed: AtomicBool::new(false),
        }
    }

    /// The owned hardware peripheral.
    pub fn hardware(&self) -> &H {
        &self.hw
    }

    /// Queues a conversion request. Main-loop context only.
    ///
    /// If the queue was idle and the hardware reports ready, the request is
    /// armed on the spot; otherwise it waits its turn behind the head.
    ///
    /// # Errors
    ///
    /// [`EnqueueError::QueueFull`] when all 8 slots are occupied. The
    /// request is dropped; the scheduler performs no retry or backoff.
    pub fn enqueue(&self, request: AdcRequest) -> EnqueueResult {
        if self.pending.load(Ordering::Acquire) as usize == QUEUE_CAPACITY {
            trace!(client = request.client.0, "request rejected, queue full");
            return Err(EnqueueError::QueueFull);
        }

        let tail = self.tail.load(Ordering::Relaxed);
        self.slots[usize::from(tail)].store(request.encode(), Ordering::Release);
        self.tail
            .store((tail + 1) % QUEUE_CAPACITY as u8, Ordering::Relaxed);

        // The slot store above is Release-ordered before this increment, so
        // the completion handler never sees a count covering an unwritten
        // slot.
        let depth = self.pending.fetch_add(1, Ordering::AcqRel) + 1;
        if depth as usize == QUEUE_CAPACITY {
            self.saturated.store(true, Ordering::Relaxed);
        }

        // Only when the queue was idle is there no completion pending that
        // would arm the next entry, so arming from this context cannot race
        // the handler.
        if depth == 1 && !self.hw.is_busy() {
            self.arm_conversion();
        }
        Ok(())
    }

    /// The request the processing cursor currently points at.
    ///
    /// The completion handler must call this *before*
    /// [`complete_conversion`](Self::complete_conversion) to attribute the
    /// finished raw value. Returns `None` when the queue is idle or the head
    /// slot was tombstoned.
    pub fn current_client(&self) -> Option<AdcRequest> {
        let head = self.head.load(Ordering::Relaxed);
        AdcRequest::decode(self.slots[usize::from(head)].load(Ordering::Acquire))
    }

    /// Retires the head entry after a hardware completion. Completion-handler
    /// context only; must be invoked exactly once per real completion.
    ///
    /// Clears the head slot, drops the depth, releases the saturation latch
    /// once the depth falls to half capacity, advances the processing cursor
    /// and arms the next live entry if one is waiting.
    pub fn complete_conversion(&self) {
        // Spurious completion with nothing queued: nothing to free. Keeps a
        // double invocation from walking the cursor over live entries.
        if self.pending.load(Ordering::Acquire) == 0 {
            return;
        }

        let head = self.head.load(Ordering::Relaxed);
        self.slots[usize::from(head)].store(SLOT_EMPTY, Ordering::Release);
        self.armed.store(false, Ordering::Release);

        let depth = self.pending.fetch_sub(1, Ordering::AcqRel) - 1;
        if depth <= SATURATION_CLEAR_DEPTH {
            self.saturated.store(false, Ordering::Relaxed);
        }
        self.head
            .store((head + 1) % QUEUE_CAPACITY as u8, Ordering::Relaxed);

        if depth > 0 {
            self.arm_conversion();
        }
    }

    /// Advances the processing cursor past tombstones and starts the head
    /// conversion if the hardware is idle.
    ///
    /// Tombstoned slots are reclaimed here: the depth drops as the cursor
    /// passes each one, so retracted capacity becomes available again
    /// without shifting the ring.
    pub fn arm_conversion(&self) {
        loop {
            if self.pending.load(Ordering::Acquire) == 0 {
                return;
            }
            let head = self.head.load(Ordering::Relaxed);
            let Some(request) = AdcRequest::decode(self.slots[usize::from(head)].load(Ordering::Acquire))
            else {
                // Tombstone: reclaim the slot and keep walking.
                self.head
                    .store((head + 1) % QUEUE_CAPACITY as u8, Ordering::Relaxed);
                let depth = self.pending.fetch_sub(1, Ordering::AcqRel) - 1;
                if depth <= SATURATION_CLEAR_DEPTH {
                    self.saturated.store(false, Ordering::Relaxed);
                }
                continue;
            };
            if !self.hw.is_busy() {
                self.armed.store(true, Ordering::Release);
                self.hw.start_conversion(request.channel);
            }
            return;
        }
    }

    /// Tombstones every queued entry belonging to `client`. Main-loop
    /// context only.
    ///
    /// An entry whose conversion is already armed on the hardware is left
    /// alone; there is no cancelling an in-flight conversion. Returns the
    /// number of entries actually removed so the caller's throttle can
    /// reconcile its outstanding count.
    pub fn retract_all(&self, client: ClientId) -> u8 {
        let mut removed = 0;
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(request) = AdcRequest::decode(slot.load(Ordering::Acquire)) else {
                continue;
            };
            if request.client != client {
                continue;
            }
            // Freshly loaded per entry: the completion handler may have
            // advanced the cursor while we walked the ring.
            let head = usize::from(self.head.load(Ordering::Relaxed));
            if index == head && self.armed.load(Ordering::Acquire) {
                continue;
            }
            slot.store(SLOT_EMPTY, Ordering::Release);
            removed += 1;
        }
        if removed > 0 {
            debug!(client = client.0, removed, "retracted queued requests");
        }
        removed
    }

    /// Resets the queue to its startup state: all slots empty, cursors and
    /// depth zeroed, latches cleared.
    ///
    /// Only safe while no conversion is in flight (startup, or after the
    /// hardware has drained).
    pub fn purge(&self) {
        for slot in &self.slots {
            slot.store(SLOT_EMPTY, Ordering::Relaxed);
        }
        self.head.store(0, Ordering::Relaxed);
        self.tail.store(0, Ordering::Relaxed);
        self.pending.store(0, Ordering::Relaxed);
        self.saturated.store(false, Ordering::Relaxed);
        self.armed.store(false, Ordering::Release);
    }

    /// Current queue depth (occupied slots, tombstones included until
    /// reclaimed).
    pub fn pending(&self) -> u8 {
        self.pending.load(Ordering::Acquire)
    }

    /// True while the congestion latch is set.
    ///
    /// Sets when the queue fills; clears once completions drain the depth to
    /// half capacity. Purely advisory — admission is governed by the exact
    /// depth, not this latch.
    pub fn is_saturated(&self) -> bool {
        self.saturated.load(Ordering::Relaxed)
    }

    /// True from arming until the matching completion.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }
}
