//! Report link — the publish-side adapter.
//!
//! Frames each register payload as `[register code, length, payload…]` and
//! hands it to the console transport, where the communication co-processor
//! picks it up for over-the-air transmission.  The transport is
//! fire-and-forget from this node's perspective: no acknowledgements, no
//! retries.

use heapless::Vec;
use log::info;

use crate::app::ports::PublishPort;
use crate::registers::{RegisterId, MAX_REGISTER_SIZE};

/// Frame: code + length + largest payload.
const FRAME_CAPACITY: usize = MAX_REGISTER_SIZE + 2;

/// Adapter that frames register payloads onto the console transport.
pub struct ReportLink;

impl ReportLink {
    pub fn new() -> Self {
        Self
    }

    /// Build the wire frame for a register payload.
    fn frame(id: RegisterId, payload: &[u8]) -> Vec<u8, FRAME_CAPACITY> {
        let mut frame = Vec::new();
        // Capacity covers code + length + MAX_REGISTER_SIZE by construction.
        let _ = frame.push(id.code());
        let _ = frame.push(payload.len() as u8);
        let _ = frame.extend_from_slice(payload);
        frame
    }
}

impl Default for ReportLink {
    fn default() -> Self {
        Self::new()
    }
}

impl PublishPort for ReportLink {
    fn publish(&mut self, id: RegisterId, payload: &[u8]) {
        let frame = Self::frame(id, payload);
        info!(
            "TX | {} reg={} len={} frame={:02X?}",
            id.name(),
            id.code(),
            payload.len(),
            frame.as_slice()
        );
    }
}
