#![no_main]

use libfuzzer_sys::fuzz_target;
use matflat::record::{extract_from_file, RecordSchema};

fuzz_target!(|data: &[u8]| {
    // Malformed files must come back as errors, never panics
    if let Ok(file) = matflat::mat::MatFile::from_bytes(data) {
        let _ = extract_from_file(&file, &RecordSchema::spike_sorting());
    }
});
