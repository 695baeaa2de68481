//! Snapshot files: the summary a run leaves behind and its raw-sample dump
//!
//! A snapshot is written once per run and never rewritten. The summary file
//! is the unit the regression detector compares; the `detailed_` dump keeps
//! every raw sample for auditing.

use crate::error::{GateError, Result};
use crate::stats::MetricStats;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Arbitrary per-sample metadata supplied by the producer
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Prefix of the raw-sample dump written next to every summary
pub const DETAILED_PREFIX: &str = "detailed_";

/// Suffix the detector uses to recognize summary files
pub const SNAPSHOT_SUFFIX: &str = "_metrics.json";

/// A single recorded observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub value: f64,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Raw samples per metric name, in recording order
pub type DetailedDump = BTreeMap<String, Vec<MetricSample>>;

/// Statistical summary of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricSnapshot {
    pub run_id: String,
    /// ISO-8601 creation time
    pub timestamp: String,
    pub metrics: BTreeMap<String, MetricStats>,
}

impl MetricSnapshot {
    /// Load a summary file
    ///
    /// Unreadable files and malformed JSON are errors; callers decide
    /// whether to abort or skip.
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self, "metric snapshot")
    }

    pub fn get(&self, metric_name: &str) -> Option<&MetricStats> {
        self.metrics.get(metric_name)
    }
}

/// Load a `detailed_` raw-sample dump
pub fn load_detailed(path: &Path) -> Result<DetailedDump> {
    read_json(path)
}

/// True for file names the detector treats as summary snapshots
///
/// # Example
/// ```
/// use voicegate::snapshot::is_snapshot_file_name;
///
/// assert!(is_snapshot_file_name("stt_accuracy_metrics.json"));
/// assert!(!is_snapshot_file_name("detailed_stt_accuracy_metrics.json"));
/// assert!(!is_snapshot_file_name("regression_report.json"));
/// ```
pub fn is_snapshot_file_name(name: &str) -> bool {
    name.ends_with(SNAPSHOT_SUFFIX) && !name.starts_with(DETAILED_PREFIX)
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| GateError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| GateError::MalformedSnapshot {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-print `value` to `path`, creating parent directories
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T, what: &'static str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| GateError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json =
        serde_json::to_string_pretty(value).map_err(|source| GateError::Serialize { what, source })?;

    std::fs::write(path, json).map_err(|source| GateError::Write {
        path: path.to_path_buf(),
        source,
    })
}
