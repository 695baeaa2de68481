//! Metrics collector: accumulates raw samples during a test run
//!
//! Producers (latency probes, accuracy checks, conversation simulators)
//! call [`MetricsCollector::record`] for every observation. At the end of
//! the run the collector is summarized into a [`MetricSnapshot`] and saved
//! next to a raw-sample dump.
//!
//! Recording takes `&self` and is serialized by an internal mutex, so one
//! collector can be shared across producer threads.

use crate::error::Result;
use crate::metric_kind::MetricKind;
use crate::regression::{Comparator, Outcome};
use crate::snapshot::{DetailedDump, Metadata, MetricSample, MetricSnapshot, DETAILED_PREFIX};
use crate::stats::MetricStats;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Collector configuration
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Where snapshots are written
    pub output_dir: PathBuf,
    /// Keep only the newest `window` samples per metric; `None` keeps all
    pub window: Option<usize>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(crate::regression::DEFAULT_CURRENT_DIR),
            window: None,
        }
    }
}

#[derive(Debug, Default)]
struct MetricSeries {
    kind: Option<MetricKind>,
    samples: VecDeque<MetricSample>,
}

impl MetricSeries {
    fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    fn stats(&self) -> Option<MetricStats> {
        MetricStats::from_values(&self.values()).map(|s| s.with_metric_type(self.kind))
    }
}

#[derive(Debug, Default)]
struct SeriesStore {
    series: BTreeMap<String, MetricSeries>,
    last_timestamp: f64,
}

/// Paths written by [`MetricsCollector::save_to_file`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSnapshot {
    pub summary_path: PathBuf,
    pub detailed_path: PathBuf,
}

/// One metric's change in a baseline comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricChange {
    pub metric: String,
    pub baseline: f64,
    pub current: f64,
    pub change_pct: f64,
}

/// Result of comparing the live collector against a saved snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineComparison {
    pub baseline_run_id: String,
    pub current_run_id: String,
    pub regressions: Vec<MetricChange>,
    pub improvements: Vec<MetricChange>,
}

/// Process-scoped accumulator of named numeric samples
///
/// # Example
/// ```
/// use voicegate::collector::MetricsCollector;
///
/// let collector = MetricsCollector::new(std::env::temp_dir().join("voicegate-doc"));
/// collector.record("stt_latency_ms", 420.0, None);
/// collector.record("stt_latency_ms", 380.0, None);
///
/// let stats = collector.get_stats("stt_latency_ms").unwrap();
/// assert_eq!(stats.count, 2);
/// assert_eq!(stats.mean, 400.0);
/// assert!(collector.get_stats("tts_latency_ms").is_none());
/// ```
#[derive(Debug)]
pub struct MetricsCollector {
    config: CollectorConfig,
    run_id: String,
    store: Mutex<SeriesStore>,
}

impl MetricsCollector {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_config(CollectorConfig {
            output_dir: output_dir.into(),
            ..CollectorConfig::default()
        })
    }

    pub fn with_config(mut config: CollectorConfig) -> Self {
        config.window = config.window.map(|w| w.max(1));
        Self {
            config,
            run_id: chrono::Local::now().format("%Y%m%d_%H%M%S").to_string(),
            store: Mutex::new(SeriesStore::default()),
        }
    }

    /// Run identifier derived from construction time (`YYYYMMDD_HHMMSS`)
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    fn store(&self) -> MutexGuard<'_, SeriesStore> {
        // An append cannot leave the map half-updated, so a poisoned lock is still usable
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one observation of `metric_name`
    pub fn record(&self, metric_name: &str, value: f64, metadata: Option<Metadata>) {
        self.append(metric_name, None, value, metadata);
    }

    /// Record one observation and tag the series with an explicit kind
    ///
    /// The first tag a series receives is kept; a later conflicting tag is
    /// ignored with a warning.
    pub fn record_typed(
        &self,
        metric_name: &str,
        kind: MetricKind,
        value: f64,
        metadata: Option<Metadata>,
    ) {
        self.append(metric_name, Some(kind), value, metadata);
    }

    fn append(
        &self,
        metric_name: &str,
        kind: Option<MetricKind>,
        value: f64,
        metadata: Option<Metadata>,
    ) {
        if !value.is_finite() {
            tracing::warn!("Dropping non-finite sample {} for {}", value, metric_name);
            return;
        }

        let now = chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0;

        let mut store = self.store();
        let timestamp = now.max(store.last_timestamp);
        store.last_timestamp = timestamp;

        let series = store.series.entry(metric_name.to_string()).or_default();

        match (series.kind, kind) {
            (None, Some(kind)) => series.kind = Some(kind),
            (Some(existing), Some(kind)) if existing != kind => {
                tracing::warn!(
                    "{} already tagged as {}, ignoring {}",
                    metric_name,
                    existing,
                    kind
                );
            }
            _ => {}
        }

        series.samples.push_back(MetricSample {
            value,
            timestamp,
            metadata: metadata.unwrap_or_default(),
        });

        if let Some(window) = self.config.window {
            while series.samples.len() > window {
                series.samples.pop_front();
            }
        }
    }

    /// Names of every recorded metric, sorted
    pub fn metric_names(&self) -> Vec<String> {
        self.store().series.keys().cloned().collect()
    }

    pub fn sample_count(&self, metric_name: &str) -> usize {
        self.store()
            .series
            .get(metric_name)
            .map_or(0, |series| series.samples.len())
    }

    /// Statistics for one metric, `None` if nothing was recorded
    pub fn get_stats(&self, metric_name: &str) -> Option<MetricStats> {
        self.store().series.get(metric_name)?.stats()
    }

    /// Snapshot of every metric currently held
    pub fn get_summary(&self) -> MetricSnapshot {
        let store = self.store();
        let metrics = store
            .series
            .iter()
            .filter_map(|(name, series)| Some((name.clone(), series.stats()?)))
            .collect();

        MetricSnapshot {
            run_id: self.run_id.clone(),
            timestamp: chrono::Local::now()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
            metrics,
        }
    }

    /// Every raw sample, per metric, in recording order
    pub fn detailed_dump(&self) -> DetailedDump {
        self.store()
            .series
            .iter()
            .map(|(name, series)| (name.clone(), series.samples.iter().cloned().collect()))
            .collect()
    }

    /// Write the summary and the raw-sample dump into the output directory
    ///
    /// The summary goes to `file_name` (default `metrics_<run_id>.json`), the
    /// dump to `detailed_<file_name>`.
    pub fn save_to_file(&self, file_name: Option<&str>) -> Result<SavedSnapshot> {
        let file_name = file_name
            .map(str::to_string)
            .unwrap_or_else(|| format!("metrics_{}.json", self.run_id));

        let summary_path = self.config.output_dir.join(&file_name);
        let detailed_path = self
            .config
            .output_dir
            .join(format!("{}{}", DETAILED_PREFIX, file_name));

        crate::snapshot::write_json(&detailed_path, &self.detailed_dump(), "detailed metrics")?;
        self.get_summary().save(&summary_path)?;

        tracing::info!("Metrics saved to {}", summary_path.display());
        tracing::info!("Detailed metrics saved to {}", detailed_path.display());

        Ok(SavedSnapshot {
            summary_path,
            detailed_path,
        })
    }

    /// Quick comparison against a saved snapshot using the naming heuristic
    ///
    /// `wer*` and `*latency_ms` regress past +20%, `pesq*` and `*accuracy`
    /// past -5%; favorable changes beyond 5% are listed as improvements.
    pub fn compare_with_baseline(&self, baseline_path: &Path) -> Result<BaselineComparison> {
        self.compare_with_baseline_using(baseline_path, &Comparator::baseline_heuristic())
    }

    /// Compare against a saved snapshot with an arbitrary comparator
    pub fn compare_with_baseline_using(
        &self,
        baseline_path: &Path,
        comparator: &Comparator,
    ) -> Result<BaselineComparison> {
        let baseline = MetricSnapshot::load(baseline_path)?;
        let current = self.get_summary();

        let baseline_run_id = if baseline.run_id.is_empty() {
            "unknown".to_string()
        } else {
            baseline.run_id.clone()
        };

        let mut comparison = BaselineComparison {
            baseline_run_id,
            current_run_id: self.run_id.clone(),
            regressions: Vec::new(),
            improvements: Vec::new(),
        };

        for (name, current_stats) in &current.metrics {
            let Some(baseline_stats) = baseline.get(name) else {
                continue;
            };
            let Some(evaluation) = comparator.evaluate_stats(name, baseline_stats, current_stats)
            else {
                continue;
            };

            let change = MetricChange {
                metric: name.clone(),
                baseline: comparator.statistic().extract(baseline_stats),
                current: comparator.statistic().extract(current_stats),
                change_pct: evaluation.change_fraction * 100.0,
            };

            match evaluation.outcome {
                Outcome::Regression(_) => comparison.regressions.push(change),
                Outcome::Improvement => comparison.improvements.push(change),
                Outcome::WithinTolerance => {}
            }
        }

        Ok(comparison)
    }

    /// Generate human-readable summary of every metric
    pub fn summary_report_string(&self) -> String {
        let summary = self.get_summary();
        let rule = "=".repeat(80);
        let mut report = String::new();

        report.push_str(&format!("\n{}\n", rule));
        report.push_str(&format!("METRICS SUMMARY - Run ID: {}\n", self.run_id));
        report.push_str(&format!("{}\n", rule));

        for (name, stats) in &summary.metrics {
            report.push_str(&format!("\n{}:\n", name));
            report.push_str(&format!("  Count:  {}\n", stats.count));
            report.push_str(&format!("  Mean:   {:.3}\n", stats.mean));
            report.push_str(&format!("  Median: {:.3}\n", stats.median));
            report.push_str(&format!("  Std:    {:.3}\n", stats.stdev));
            report.push_str(&format!("  Min:    {:.3}\n", stats.min));
            report.push_str(&format!("  Max:    {:.3}\n", stats.max));
            report.push_str(&format!("  p50:    {:.3}\n", stats.p50));
            report.push_str(&format!("  p95:    {:.3}\n", stats.p95));
            report.push_str(&format!("  p99:    {:.3}\n", stats.p99));
        }

        report.push_str(&format!("\n{}\n", rule));
        report
    }

    pub fn print_summary(&self) {
        print!("{}", self.summary_report_string());
    }
}
