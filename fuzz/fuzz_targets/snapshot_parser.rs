#![no_main]

use libfuzzer_sys::fuzz_target;
use voicegate::regression::Comparator;
use voicegate::snapshot::MetricSnapshot;

fuzz_target!(|data: &[u8]| {
    // Arbitrary snapshot bytes must never panic the comparison path
    if let Ok(snapshot) = serde_json::from_slice::<MetricSnapshot>(data) {
        let comparator = Comparator::baseline_heuristic();
        for (name, stats) in &snapshot.metrics {
            let _ = comparator.evaluate_stats(name, stats, stats);
        }
    }
});
