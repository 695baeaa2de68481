// Threshold-based regression detection for voice-quality metrics
//
// Compares a current run's snapshot summaries against a stored baseline.
// Every metric is mapped to a type (word error rate, latency, accuracy, ...)
// whose direction decides whether an increase or a decrease is a regression,
// and the size of the change is graded against a warning and a critical
// threshold.
//
// Exit-status contract: a caller must exit non-zero when
// `RegressionSet::has_critical_regressions` is true.

mod comparator;
mod detector;
mod report;

pub use comparator::{
    Classifier, Comparator, Evaluation, Outcome, RegressionResult, Severity, Statistic,
};
pub use detector::{
    DetectorConfig, MalformedPolicy, RegressionDetector, DEFAULT_BASELINE_DIR,
    DEFAULT_CURRENT_DIR, REPORT_FILE_NAME,
};
pub use report::{RegressionReport, RegressionSet, SeverityCounts};
