//! Change/counter engine for the monitored line bank.
//!
//! The [`LineRegistry`] owns the last-known level of every monitored line,
//! the two composed state bytes, and the four pulse counters.  One call to
//! [`LineRegistry::sample`] is one sampling pass: it re-reads every line,
//! rebuilds both state bytes from scratch, and classifies what changed since
//! the previous pass.
//!
//! The registry is an owned struct threaded through the service — none of
//! its state lives in statics.  The only ISR-shared state in the system is
//! the pending-interrupt flag in [`crate::power`].

use log::debug;
use serde::{Deserialize, Serialize};

use crate::app::ports::InputPort;
use crate::config::NodeConfig;
use crate::pins::{BINARY_LINE_COUNT, BINARY_LINE_GPIOS, COUNTER_LINE_COUNT, COUNTER_LINE_GPIOS};

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Logic level of a monitored line.
///
/// The "unknown" state of a freshly booted line is modelled as
/// `Option<Level>::None` in the registry, not as a third variant — a port
/// read always yields a definite level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Map a raw GPIO read to a level.
    pub fn from_high(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }

    pub fn is_high(self) -> bool {
        self == Self::High
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Summary of one sampling pass, used to decide what gets published.
///
/// Ordered: a pass's result is the maximum reached across all lines, and a
/// counter change always implies a binary change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Classification {
    /// No line level differs from the previous pass.
    NoChange,
    /// At least one line level changed; no counter incremented.
    BinaryChanged,
    /// At least one counter line saw an active-level edge and incremented.
    BinaryAndCounterChanged,
}

// ---------------------------------------------------------------------------
// LineRegistry
// ---------------------------------------------------------------------------

/// Last-known levels, composed state bytes, and pulse counters for the whole
/// line bank.  Constructed once at startup; mutated only by [`sample`].
///
/// [`sample`]: LineRegistry::sample
pub struct LineRegistry {
    binary_gpios: [i32; BINARY_LINE_COUNT],
    counter_gpios: [i32; COUNTER_LINE_COUNT],

    /// `None` until the line has been observed once.
    last_binary: [Option<Level>; BINARY_LINE_COUNT],
    last_counter: [Option<Level>; COUNTER_LINE_COUNT],

    /// Composed on every pass; bit i = level of line i in its group.
    binary_byte: u8,
    counter_byte: u8,

    /// Monotonic (modulo u32 wrap) pulse accumulators, one per counter line.
    counters: [u32; COUNTER_LINE_COUNT],

    active_level: Level,
    count_initial_active: bool,
}

impl LineRegistry {
    /// Build the registry over the board's line map with all levels unknown
    /// and all counters at zero.
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            binary_gpios: BINARY_LINE_GPIOS,
            counter_gpios: COUNTER_LINE_GPIOS,
            last_binary: [None; BINARY_LINE_COUNT],
            last_counter: [None; COUNTER_LINE_COUNT],
            binary_byte: 0,
            counter_byte: 0,
            counters: [0; COUNTER_LINE_COUNT],
            active_level: config.active_level,
            count_initial_active: config.count_initial_active,
        }
    }

    /// Run one sampling pass.
    ///
    /// Reads every line in fixed index order, rebuilds both state bytes
    /// unconditionally, updates last-known levels, and increments a counter
    /// for every counter line whose level changed *to* the active level
    /// (at most one increment per line per pass — edges between passes are
    /// coalesced).  A line observed for the first time is treated exactly
    /// like a changed line; when `count_initial_active` is off, that first
    /// observation raises the classification but never a counter.
    ///
    /// Total: this operation cannot fail.
    pub fn sample(&mut self, inputs: &impl InputPort) -> Classification {
        let mut class = Classification::NoChange;

        self.binary_byte = 0;
        for (i, &gpio) in self.binary_gpios.iter().enumerate() {
            let level = inputs.level(gpio);
            if level.is_high() {
                self.binary_byte |= 1 << i;
            }
            if self.last_binary[i] != Some(level) {
                self.last_binary[i] = Some(level);
                class = class.max(Classification::BinaryChanged);
            }
        }

        self.counter_byte = 0;
        for (i, &gpio) in self.counter_gpios.iter().enumerate() {
            let level = inputs.level(gpio);
            if level.is_high() {
                self.counter_byte |= 1 << i;
            }
            let previous = self.last_counter[i];
            if previous != Some(level) {
                self.last_counter[i] = Some(level);
                class = class.max(Classification::BinaryChanged);

                if level == self.active_level
                    && (previous.is_some() || self.count_initial_active)
                {
                    self.counters[i] = self.counters[i].wrapping_add(1);
                    class = Classification::BinaryAndCounterChanged;
                }
            }
        }

        debug!(
            "sample: class={:?} states=[{:#04x},{:#04x}] counters={:?}",
            class, self.counter_byte, self.binary_byte, self.counters
        );
        class
    }

    /// The two composed state bytes, counter group first.
    /// A verbatim copy of the most recent pass — never recomputed here.
    pub fn state_bytes(&self) -> [u8; 2] {
        [self.counter_byte, self.binary_byte]
    }

    /// Current pulse counter values, in line-index order.
    pub fn counters(&self) -> [u32; COUNTER_LINE_COUNT] {
        self.counters
    }
}
