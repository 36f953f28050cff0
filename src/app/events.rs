//! Outbound application events.
//!
//! The [`NodeService`](super::service::NodeService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them — log to serial, record in tests, etc.

use crate::power::WakeReason;
use crate::registers::RegisterId;
use crate::sampling::Classification;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Startup seeding finished (carries the seed-pass classification).
    Started { classification: Classification },

    /// The node woke from sleep.
    WokeUp { reason: WakeReason },

    /// A sampling pass completed.
    Sampled { classification: Classification },

    /// A register payload was handed to the transport.
    Published { register: RegisterId },

    /// An interrupt wake resolved to no net change — nothing published.
    QuietWake,

    /// The report interval was changed at runtime.
    ReportIntervalChanged { secs: u32 },
}
