//! Fuzz target: counters register wire layout.
//!
//! Decodes arbitrary 16-byte payloads with the documented reversed/
//! big-endian layout and asserts the decode/encode pair is a lossless
//! round trip in both directions.
//!
//! cargo fuzz run fuzz_counter_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use pulsenode::registers::{CounterBank, Reportable};

fuzz_target!(|data: &[u8]| {
    if data.len() < 16 {
        return;
    }
    let payload: [u8; 16] = data[..16].try_into().unwrap();

    let bank = CounterBank::decode(&payload);
    let mut wire = [0u8; 16];
    assert_eq!(bank.encode(&mut wire), 16);
    assert_eq!(wire, payload, "decode/encode must round-trip the wire bytes");

    // And the value view round-trips too.
    let again = CounterBank::decode(&wire);
    assert_eq!(again.counts(), bank.counts());
});
