//! Summary statistics for a metric series
//!
//! Tail percentiles degrade gracefully on small samples: `p95` needs at
//! least 20 values and `p99` at least 100, otherwise both fall back to the
//! maximum instead of reporting a falsely precise estimate.

use crate::metric_kind::MetricKind;
use serde::{Deserialize, Serialize};

/// Minimum sample count for a true 95th percentile
pub const P95_MIN_SAMPLES: usize = 20;

/// Minimum sample count for a true 99th percentile
pub const P99_MIN_SAMPLES: usize = 100;

/// Statistical summary of one metric, as stored in snapshot files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1), zero for a single value
    pub stdev: f64,
    pub min: f64,
    pub max: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    /// Explicit metric type, present only when the series was tagged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<MetricKind>,
}

impl MetricStats {
    /// Compute statistics over `values`, `None` when empty
    ///
    /// # Example
    /// ```
    /// use voicegate::stats::MetricStats;
    ///
    /// let stats = MetricStats::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    /// assert_eq!(stats.count, 5);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// assert_eq!(stats.p95, 5.0); // fewer than 20 samples: falls back to max
    /// ```
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;

        let stdev = if count > 1 {
            let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (sum_sq / (count - 1) as f64).sqrt()
        } else {
            0.0
        };

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let min = sorted[0];
        let max = sorted[count - 1];
        let median = median_of_sorted(&sorted);

        let p95 = if count >= P95_MIN_SAMPLES {
            exclusive_quantile(&sorted, 19, 20)
        } else {
            max
        };
        let p99 = if count >= P99_MIN_SAMPLES {
            exclusive_quantile(&sorted, 99, 100)
        } else {
            max
        };

        Some(Self {
            count,
            mean,
            median,
            stdev,
            min,
            max,
            p50: median,
            p95,
            p99,
            metric_type: None,
        })
    }

    pub fn with_metric_type(mut self, kind: Option<MetricKind>) -> Self {
        self.metric_type = kind;
        self
    }
}

/// Median of already-sorted, non-empty data
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Cut point `i` of `parts` equal-probability intervals, exclusive method
///
/// Positions are taken at `i * (n + 1) / parts` (1-based) and interpolated
/// linearly between neighbours. Requires `sorted.len() >= 2` and
/// `0 < i < parts`.
fn exclusive_quantile(sorted: &[f64], i: usize, parts: usize) -> f64 {
    let n = sorted.len();
    let m = n + 1;
    let j = (i * m / parts).clamp(1, n - 1);
    let delta = (i * m).saturating_sub(j * parts).min(parts);
    let (lo, hi) = (sorted[j - 1], sorted[j]);
    let interpolated = (lo * (parts - delta) as f64 + hi * delta as f64) / parts as f64;
    // NaN neighbours leave no valid range to clamp into
    if lo <= hi {
        interpolated.clamp(lo, hi)
    } else {
        interpolated
    }
}
