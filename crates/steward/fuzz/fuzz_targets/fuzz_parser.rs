//! Fuzz target for the data parser and the offline pipeline.
//!
//! Any byte input either fails to parse with an error or produces a dataset
//! that can be profiled, scored and given recommendations without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use steward::Steward;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let steward = Steward::new();
    if let Ok(dataset) = steward.load_bytes(data) {
        let _ = steward.quality(&dataset);
        let _ = steward.recommend(&dataset);
    }
});
