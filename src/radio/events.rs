//! Radio event queue
//!
//! WiFi driver callbacks run in event context and must not touch the
//! coordinator. They post a `RadioEvent` through an `EventSender`; the
//! coordinator drains the queue from `poll`.
//!
//! # Architecture
//!
//! ```text
//! driver callback ──post──▶ RadioEvents (Channel, N=16) ──try_receive──▶ RadioCoordinator::poll
//! ```

use crate::platform::traits::{Ipv4, MacAddress};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Sender};

/// Queue capacity
pub const EVENT_QUEUE_SIZE: usize = 16;

/// Status change reported by the WiFi driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "esp32", derive(defmt::Format))]
pub enum RadioEvent {
    StationConnected,
    StationDisconnected,
    StationGotIp(Ipv4),
    /// Scan finished with this many results
    ScanDone(u16),
    SoftApStarted,
    SoftApStopped,
    EspNowSendComplete { peer: MacAddress, success: bool },
}

/// Single-consumer event queue
pub struct RadioEvents {
    channel: Channel<CriticalSectionRawMutex, RadioEvent, EVENT_QUEUE_SIZE>,
}

impl RadioEvents {
    /// Create an empty queue; usable in `static` initializers
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Handle for event context
    pub fn sender(&self) -> EventSender<'_> {
        EventSender {
            inner: self.channel.sender(),
        }
    }

    /// Take the oldest queued event
    pub(crate) fn try_receive(&self) -> Option<RadioEvent> {
        self.channel.try_receive().ok()
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl Default for RadioEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Posting handle for driver callbacks
#[derive(Clone, Copy)]
pub struct EventSender<'a> {
    inner: Sender<'a, CriticalSectionRawMutex, RadioEvent, EVENT_QUEUE_SIZE>,
}

impl EventSender<'_> {
    /// Queue an event without blocking; `false` if the queue is full
    pub fn post(&self, event: RadioEvent) -> bool {
        let posted = self.inner.try_send(event).is_ok();
        if !posted {
            crate::log_warn!("radio: event queue full, dropping event");
        }
        posted
    }
}
