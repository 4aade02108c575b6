//! Fuzz target: `max31855::decode`
//!
//! Feeds arbitrary bus responses through the same path the acquisition
//! loop uses and asserts that decoding never panics, that the fault flag
//! always wins, and that readings stay inside the converter's range.
//!
//! cargo fuzz run fuzz_max31855_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use thermoclick::sensors::max31855::{RawFrame, decode};

fuzz_target!(|data: &[u8]| {
    // Anything but exactly four bytes is a short read.
    let Ok(frame) = RawFrame::try_from(data) else {
        assert_ne!(data.len(), 4);
        return;
    };

    let faulted = frame.register() & (1 << 16) != 0;
    match decode(frame) {
        Ok(r) => {
            assert!(!faulted, "fault flag set but reading returned");
            let tc = r.thermocouple_celsius();
            assert!((-512.0..=511.75).contains(&tc), "thermocouple out of range: {tc}");
            let internal = r.internal_celsius();
            assert!((-64.0..=65.0).contains(&internal), "internal out of range: {internal}");
        }
        Err(_) => assert!(faulted, "fault reported without the fault flag"),
    }
});
