#![no_main]
use libfuzzer_sys::fuzz_target;
use roast_core::{AnalysisParams, derive_columns};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must yield either a series or a ParseError, never a panic.
    // Whatever parses must also survive the full derivation pass.
    if let Ok((series, milestones)) = roast_core::log::parse_log_bytes(data) {
        let params = AnalysisParams::default();
        let derived = derive_columns(&series, &params);
        let _ = milestones.with_defaults(&derived, params.turning_point_window_s);
    }
});
