// Snapshot-to-snapshot comparison strategy
//
// One comparator serves both the collector's quick baseline check and the
// batch detector. What differs between them is data, not code:
// - the threshold table (tiered vs. single cutoff)
// - how a metric name maps to a kind (substring vs. prefix/suffix)
// - which summary statistic is compared (mean by default)

use crate::metric_kind::{Direction, MetricKind};
use crate::stats::MetricStats;
use crate::thresholds::ThresholdTable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Regression severity, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Warning, Severity::Info];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary statistic compared between baseline and current
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Statistic {
    #[default]
    Mean,
    Median,
    P50,
    P95,
    P99,
}

impl Statistic {
    pub fn extract(self, stats: &MetricStats) -> f64 {
        match self {
            Statistic::Mean => stats.mean,
            Statistic::Median => stats.median,
            Statistic::P50 => stats.p50,
            Statistic::P95 => stats.p95,
            Statistic::P99 => stats.p99,
        }
    }
}

/// How a metric name is mapped to a kind when it carries no explicit tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classifier {
    /// First taxonomy key contained anywhere in the name
    Substring,
    /// `wer*`, `*latency_ms`, `pesq*`, `*accuracy` only
    Affix,
}

impl Classifier {
    pub fn classify(self, metric_name: &str) -> Option<MetricKind> {
        match self {
            Classifier::Substring => MetricKind::classify(metric_name),
            Classifier::Affix => MetricKind::classify_affix(metric_name),
        }
    }
}

/// A classified regression for one metric
///
/// `change_percent` and `threshold_exceeded` are percentages; the latter is
/// always non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub metric_name: String,
    pub severity: Severity,
    pub baseline_value: f64,
    pub current_value: f64,
    pub change_percent: f64,
    pub threshold_exceeded: f64,
}

/// Outcome of comparing one metric
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Regression(RegressionResult),
    /// Favorable change larger than the improvement floor
    Improvement,
    WithinTolerance,
}

/// Full comparison of one metric, including the non-regression outcomes
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub kind: MetricKind,
    /// `(current - baseline) / baseline`
    pub change_fraction: f64,
    pub outcome: Outcome,
}

/// Threshold-table driven comparator
#[derive(Debug, Clone)]
pub struct Comparator {
    table: ThresholdTable,
    classifier: Classifier,
    statistic: Statistic,
}

impl Comparator {
    pub fn new(table: ThresholdTable, classifier: Classifier, statistic: Statistic) -> Self {
        Self {
            table,
            classifier,
            statistic,
        }
    }

    /// Tiered thresholds, substring classification, compares means
    pub fn tiered(table: ThresholdTable) -> Self {
        Self::new(table, Classifier::Substring, Statistic::Mean)
    }

    /// Single cutoff per kind with prefix/suffix classification
    pub fn baseline_heuristic() -> Self {
        Self::new(
            ThresholdTable::baseline_heuristic(),
            Classifier::Affix,
            Statistic::Mean,
        )
    }

    pub fn with_statistic(mut self, statistic: Statistic) -> Self {
        self.statistic = statistic;
        self
    }

    pub fn table(&self) -> &ThresholdTable {
        &self.table
    }

    pub fn statistic(&self) -> Statistic {
        self.statistic
    }

    /// Kind used for `metric_name`; an explicit tag wins over inference
    pub fn metric_kind(&self, metric_name: &str, tag: Option<MetricKind>) -> Option<MetricKind> {
        tag.or_else(|| self.classifier.classify(metric_name))
    }

    /// Compare two summaries of the same metric using the configured statistic
    pub fn evaluate_stats(
        &self,
        metric_name: &str,
        baseline: &MetricStats,
        current: &MetricStats,
    ) -> Option<Evaluation> {
        let tag = current.metric_type.or(baseline.metric_type);
        self.evaluate(
            metric_name,
            tag,
            self.statistic.extract(baseline),
            self.statistic.extract(current),
        )
    }

    /// Classify the change from `baseline_value` to `current_value`
    ///
    /// Returns `None` when the change cannot be judged: a zero baseline, a
    /// name that maps to no kind, or a kind missing from the table.
    pub fn evaluate(
        &self,
        metric_name: &str,
        tag: Option<MetricKind>,
        baseline_value: f64,
        current_value: f64,
    ) -> Option<Evaluation> {
        if baseline_value == 0.0 {
            tracing::debug!("Skipping {}: baseline value is zero", metric_name);
            return None;
        }

        let change_fraction = (current_value - baseline_value) / baseline_value;

        let Some(kind) = self.metric_kind(metric_name, tag) else {
            tracing::debug!("Skipping {}: no metric type matches", metric_name);
            return None;
        };
        let thresholds = self.table.get(kind)?;

        // Fold both directions onto "positive means worse"
        let (adverse, warning, critical) = match kind.direction() {
            Direction::LowerIsBetter => (change_fraction, thresholds.warning, thresholds.critical),
            Direction::HigherIsBetter => {
                (-change_fraction, -thresholds.warning, -thresholds.critical)
            }
        };

        let tier = if adverse > critical {
            Some((Severity::Critical, adverse - critical))
        } else if adverse > warning {
            Some((Severity::Warning, adverse - warning))
        } else {
            self.table
                .info_floor
                .filter(|floor| adverse > *floor)
                .map(|floor| (Severity::Info, adverse - floor))
        };

        let outcome = match tier {
            Some((severity, exceeded)) => Outcome::Regression(RegressionResult {
                metric_name: metric_name.to_string(),
                severity,
                baseline_value,
                current_value,
                change_percent: change_fraction * 100.0,
                threshold_exceeded: exceeded * 100.0,
            }),
            None if -adverse > self.table.improvement_floor => Outcome::Improvement,
            None => Outcome::WithinTolerance,
        };

        Some(Evaluation {
            kind,
            change_fraction,
            outcome,
        })
    }

    /// Regression for one metric, if any
    pub fn check_regression(
        &self,
        metric_name: &str,
        baseline_value: f64,
        current_value: f64,
    ) -> Option<RegressionResult> {
        match self.evaluate(metric_name, None, baseline_value, current_value)?.outcome {
            Outcome::Regression(result) => Some(result),
            Outcome::Improvement | Outcome::WithinTolerance => None,
        }
    }
}
