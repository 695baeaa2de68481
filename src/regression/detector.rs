// Batch regression detection over two directories of snapshot summaries
//
// Pipeline: LOAD snapshots → MATCH metric names → COMPARE statistic →
// CLASSIFY severity → REPORT. Every metric is judged independently of the
// others; nothing is retained between runs.

use crate::error::{GateError, Result};
use crate::metric_kind::MetricKind;
use crate::regression::comparator::{Comparator, Outcome, RegressionResult, Statistic};
use crate::regression::report::RegressionSet;
use crate::snapshot::{is_snapshot_file_name, MetricSnapshot};
use crate::thresholds::ThresholdTable;
use std::path::{Path, PathBuf};

/// Conventional baseline location, relative to the working directory
pub const DEFAULT_BASELINE_DIR: &str = "tests/baseline";

/// Conventional location of the current run's snapshots
pub const DEFAULT_CURRENT_DIR: &str = "tests/results";

/// Report file written into the current directory by default
pub const REPORT_FILE_NAME: &str = "regression_report.json";

/// What to do with a snapshot file that cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Fail the whole detection run
    #[default]
    Abort,
    /// Log a warning and treat the file like a missing baseline
    Skip,
}

/// Configuration for batch regression detection
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub baseline_dir: PathBuf,
    pub current_dir: PathBuf,
    pub statistic: Statistic,
    /// Also scan sub-directories, matching baselines by relative path
    pub recursive: bool,
    pub on_malformed: MalformedPolicy,
}

impl DetectorConfig {
    pub fn new(baseline_dir: impl Into<PathBuf>, current_dir: impl Into<PathBuf>) -> Self {
        Self {
            baseline_dir: baseline_dir.into(),
            current_dir: current_dir.into(),
            statistic: Statistic::Mean,
            recursive: false,
            on_malformed: MalformedPolicy::Abort,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASELINE_DIR, DEFAULT_CURRENT_DIR)
    }
}

/// Compares a current run's snapshots against a stored baseline
pub struct RegressionDetector {
    config: DetectorConfig,
    comparator: Comparator,
}

impl RegressionDetector {
    /// Detector with the default threshold table
    pub fn new(baseline_dir: impl Into<PathBuf>, current_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: DetectorConfig::new(baseline_dir, current_dir),
            comparator: Comparator::tiered(ThresholdTable::default()),
        }
    }

    pub fn with_config(config: DetectorConfig, thresholds: ThresholdTable) -> Result<Self> {
        thresholds.validate().map_err(GateError::InvalidThresholds)?;
        let comparator = Comparator::tiered(thresholds).with_statistic(config.statistic);
        Ok(Self { config, comparator })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        self.comparator.table()
    }

    /// Report path used when the caller does not pick one
    pub fn default_report_path(&self) -> PathBuf {
        self.config.current_dir.join(REPORT_FILE_NAME)
    }

    /// Metric type inferred from the name, `None` if unrecognized
    pub fn get_metric_type(&self, metric_name: &str) -> Option<MetricKind> {
        self.comparator.metric_kind(metric_name, None)
    }

    /// Classify one metric's change from baseline
    ///
    /// # Example
    /// ```
    /// use voicegate::regression::{RegressionDetector, Severity};
    ///
    /// let detector = RegressionDetector::new("baseline", "results");
    /// let result = detector.check_regression("stt_wer_clean", 0.05, 0.07).unwrap();
    /// assert_eq!(result.severity, Severity::Critical);
    /// assert!(detector.check_regression("stt_wer_clean", 0.0, 0.07).is_none());
    /// ```
    pub fn check_regression(
        &self,
        metric_name: &str,
        baseline_value: f64,
        current_value: f64,
    ) -> Option<RegressionResult> {
        self.comparator
            .check_regression(metric_name, baseline_value, current_value)
    }

    /// Compare every current snapshot against its baseline counterpart
    pub fn detect_regressions(&self) -> Result<RegressionSet> {
        let mut regressions = RegressionSet::new();

        for relative in self.snapshot_files()? {
            let baseline_path = self.config.baseline_dir.join(&relative);
            if !baseline_path.is_file() {
                tracing::info!("No baseline for {}, skipping", relative.display());
                continue;
            }

            let current_path = self.config.current_dir.join(&relative);
            let Some(current) = self.load(&current_path)? else {
                continue;
            };
            let Some(baseline) = self.load(&baseline_path)? else {
                continue;
            };

            let found = self.compare_snapshots(&baseline, &current, &mut regressions);
            tracing::debug!(
                "{}: {} regression(s) across {} metric(s)",
                relative.display(),
                found,
                current.metrics.len()
            );
        }

        Ok(regressions)
    }

    /// Compare two loaded snapshots, returning how many regressions were added
    pub fn compare_snapshots(
        &self,
        baseline: &MetricSnapshot,
        current: &MetricSnapshot,
        regressions: &mut RegressionSet,
    ) -> usize {
        let mut found = 0;

        for (name, current_stats) in &current.metrics {
            let Some(baseline_stats) = baseline.get(name) else {
                continue;
            };

            let Some(evaluation) = self
                .comparator
                .evaluate_stats(name, baseline_stats, current_stats)
            else {
                continue;
            };

            if let Outcome::Regression(result) = evaluation.outcome {
                regressions.push(result);
                found += 1;
            }
        }

        found
    }

    fn load(&self, path: &Path) -> Result<Option<MetricSnapshot>> {
        match MetricSnapshot::load(path) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err @ GateError::MalformedSnapshot { .. })
                if self.config.on_malformed == MalformedPolicy::Skip =>
            {
                match std::error::Error::source(&err) {
                    Some(cause) => tracing::warn!("{}: {}, skipping", err, cause),
                    None => tracing::warn!("{}, skipping", err),
                }
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Summary files in the current directory, relative to it, sorted
    fn snapshot_files(&self) -> Result<Vec<PathBuf>> {
        let root = &self.config.current_dir;
        if !root.is_dir() {
            tracing::warn!("Current directory {} does not exist", root.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut pending = vec![PathBuf::new()];

        while let Some(relative_dir) = pending.pop() {
            let dir = root.join(&relative_dir);
            let entries = std::fs::read_dir(&dir).map_err(|source| GateError::Read {
                path: dir.clone(),
                source,
            })?;

            for entry in entries {
                let entry = entry.map_err(|source| GateError::Read {
                    path: dir.clone(),
                    source,
                })?;
                let path = entry.path();
                let relative = relative_dir.join(entry.file_name());

                if path.is_dir() {
                    if self.config.recursive {
                        pending.push(relative);
                    }
                } else if entry.file_name().to_str().is_some_and(is_snapshot_file_name) {
                    files.push(relative);
                }
            }
        }

        files.sort();
        Ok(files)
    }
}
