#![no_main]

use libfuzzer_sys::fuzz_target;
use voicegate::thresholds::ThresholdTable;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let _ = ThresholdTable::from_toml_str(input);
    }
});
