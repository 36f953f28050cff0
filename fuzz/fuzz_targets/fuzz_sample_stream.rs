//! Fuzz target: sampling engine robustness.
//!
//! Interprets the input as a stream of per-pass level bitmasks and drives
//! the change/counter engine through it, asserting the invariants that must
//! hold after every pass: no panic, state bytes equal the pass levels, and
//! counters never move on a pass classified NoChange.
//!
//! cargo fuzz run fuzz_sample_stream

#![no_main]

use libfuzzer_sys::fuzz_target;
use pulsenode::app::ports::InputPort;
use pulsenode::config::NodeConfig;
use pulsenode::pins::{BINARY_LINE_GPIOS, COUNTER_LINE_GPIOS};
use pulsenode::sampling::{Classification, Level, LineRegistry};

struct MaskLines {
    binary: u8,
    counter: u8,
}

impl InputPort for MaskLines {
    fn level(&self, gpio: i32) -> Level {
        if let Some(i) = BINARY_LINE_GPIOS.iter().position(|&g| g == gpio) {
            Level::from_high((self.binary >> i) & 1 == 1)
        } else if let Some(i) = COUNTER_LINE_GPIOS.iter().position(|&g| g == gpio) {
            Level::from_high((self.counter >> i) & 1 == 1)
        } else {
            Level::Low
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut reg = LineRegistry::new(&NodeConfig::default());

    for pair in data.chunks_exact(2) {
        let pass = MaskLines {
            binary: pair[0],
            counter: pair[1] & 0x0F,
        };

        let before = reg.counters();
        let class = reg.sample(&pass);

        assert_eq!(reg.state_bytes(), [pass.counter, pass.binary]);
        if class == Classification::NoChange {
            assert_eq!(reg.counters(), before, "counters moved on NoChange");
        }
    }
});
