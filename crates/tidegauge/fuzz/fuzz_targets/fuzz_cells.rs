//! Fuzz target for cell parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tidegauge::inference::{parse_number, parse_year};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Some(v) = parse_number(s) {
            assert!(v.is_finite());
        }
        let _ = parse_year(s);
    }
});
