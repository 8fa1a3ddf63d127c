//! Fuzz target for the upload path.
//!
//! Arbitrary bytes go through decoding, parsing, and inference. None of it
//! may panic, and the loader must still hand back a non-empty series.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tidegauge::{Parser, SchemaInferrer, SeriesLoader, SeriesRequest};

fuzz_target!(|data: &[u8]| {
    // Uploads are at most a few thousand rows
    if data.len() > 100_000 {
        return;
    }

    if let Ok(parsed) = Parser::new().parse_bytes(data, "fuzz") {
        let _ = SchemaInferrer::new().infer(&parsed.table);
    }

    let loaded = SeriesLoader::new().load(SeriesRequest::Upload {
        bytes: data.to_vec(),
        name: "fuzz".to_string(),
    });
    assert!(!loaded.table.is_empty());
});
