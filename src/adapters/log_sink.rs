//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { classification } => {
                info!("START | seed pass classified {:?}", classification);
            }
            AppEvent::WokeUp { reason } => {
                info!("WAKE  | {:?}", reason);
            }
            AppEvent::Sampled { classification } => {
                info!("PASS  | {:?}", classification);
            }
            AppEvent::Published { register } => {
                info!("PUB   | {} (reg {})", register.name(), register.code());
            }
            AppEvent::QuietWake => {
                info!("PASS  | quiet wake, nothing published");
            }
            AppEvent::ReportIntervalChanged { secs } => {
                info!("CONF  | report interval -> {}s", secs);
            }
        }
    }
}
