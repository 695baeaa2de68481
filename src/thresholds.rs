//! Threshold table shared by every comparator
//!
//! Thresholds are signed fractions of the baseline value. The sign encodes
//! the direction: a positive threshold fires when the metric increases by
//! more than that fraction, a negative one when it decreases by more.

use crate::error::{GateError, Result};
use crate::metric_kind::{Direction, MetricKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Warning and critical cutoffs for one metric kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub warning: f64,
    pub critical: f64,
}

impl Thresholds {
    pub const fn new(warning: f64, critical: f64) -> Self {
        Self { warning, critical }
    }
}

/// Static mapping from metric kind to its thresholds
///
/// # Example
/// ```
/// use voicegate::metric_kind::MetricKind;
/// use voicegate::thresholds::ThresholdTable;
///
/// let table = ThresholdTable::default();
/// assert_eq!(table.get(MetricKind::Wer).unwrap().critical, 0.20);
/// assert_eq!(table.get(MetricKind::Accuracy).unwrap().warning, -0.05);
/// assert!(table.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    entries: BTreeMap<MetricKind, Thresholds>,

    /// Unfavorable changes larger than this fraction but short of the
    /// warning cutoff are reported as `info`. Off (`None`) unless enabled
    /// through the threshold file or [`ThresholdTable::with_info_floor`].
    pub info_floor: Option<f64>,

    /// Favorable changes larger than this fraction count as improvements
    pub improvement_floor: f64,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        let entries = BTreeMap::from([
            (MetricKind::Wer, Thresholds::new(0.10, 0.20)),
            (MetricKind::LatencyMs, Thresholds::new(0.20, 0.30)),
            (MetricKind::FalseInterruptionRate, Thresholds::new(0.15, 0.25)),
            (MetricKind::Accuracy, Thresholds::new(-0.05, -0.10)),
            (MetricKind::Pesq, Thresholds::new(-0.05, -0.10)),
            (MetricKind::SuccessRate, Thresholds::new(-0.10, -0.15)),
        ]);

        Self {
            entries,
            info_floor: None,
            improvement_floor: 0.05,
        }
    }
}

/// On-disk form of a threshold table
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ThresholdFile {
    #[serde(default)]
    thresholds: HashMap<String, Thresholds>,
    /// Negative value in the file disables the info tier
    info_floor: Option<f64>,
    improvement_floor: Option<f64>,
}

impl ThresholdTable {
    /// Single-cutoff table used by the collector's baseline comparison
    ///
    /// Lower-is-better kinds regress past +20%, higher-is-better kinds past
    /// -5%. There is no separate warning tier and no info tier.
    pub fn baseline_heuristic() -> Self {
        let entries = BTreeMap::from([
            (MetricKind::Wer, Thresholds::new(0.20, 0.20)),
            (MetricKind::LatencyMs, Thresholds::new(0.20, 0.20)),
            (MetricKind::Accuracy, Thresholds::new(-0.05, -0.05)),
            (MetricKind::Pesq, Thresholds::new(-0.05, -0.05)),
        ]);

        Self {
            entries,
            info_floor: None,
            improvement_floor: 0.05,
        }
    }

    pub fn get(&self, kind: MetricKind) -> Option<&Thresholds> {
        self.entries.get(&kind)
    }

    /// Replace the thresholds for one kind
    pub fn with_thresholds(mut self, kind: MetricKind, thresholds: Thresholds) -> Self {
        self.entries.insert(kind, thresholds);
        self
    }

    pub fn with_info_floor(mut self, info_floor: Option<f64>) -> Self {
        self.info_floor = info_floor;
        self
    }

    pub fn kinds(&self) -> impl Iterator<Item = MetricKind> + '_ {
        self.entries.keys().copied()
    }

    /// Parse a TOML threshold file, layering its entries over the defaults
    pub fn from_toml_str(input: &str) -> std::result::Result<Self, String> {
        let file: ThresholdFile = toml::from_str(input).map_err(|e| e.to_string())?;
        Self::from_parsed(file)
    }

    /// Load and validate a TOML threshold file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| GateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ThresholdFile =
            toml::from_str(&content).map_err(|source| GateError::ThresholdParse {
                path: path.to_path_buf(),
                source,
            })?;
        let table = Self::from_parsed(file).map_err(GateError::InvalidThresholds)?;
        tracing::debug!(
            "Loaded threshold table from {} ({} kinds)",
            path.display(),
            table.entries.len()
        );
        Ok(table)
    }

    fn from_parsed(file: ThresholdFile) -> std::result::Result<Self, String> {
        let mut table = Self::default();

        for (key, thresholds) in file.thresholds {
            let kind = MetricKind::from_key(&key)
                .ok_or_else(|| format!("unknown metric type '{}'", key))?;
            table.entries.insert(kind, thresholds);
        }

        if let Some(floor) = file.info_floor {
            table.info_floor = (floor >= 0.0).then_some(floor);
        }
        if let Some(floor) = file.improvement_floor {
            table.improvement_floor = floor;
        }

        table.validate()?;
        Ok(table)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (kind, t) in &self.entries {
            if !t.warning.is_finite() || !t.critical.is_finite() {
                return Err(format!("{}: thresholds must be finite", kind));
            }

            let (warning, critical) = match kind.direction() {
                Direction::LowerIsBetter => (t.warning, t.critical),
                Direction::HigherIsBetter => (-t.warning, -t.critical),
            };

            if warning <= 0.0 {
                return Err(format!(
                    "{}: warning threshold has the wrong sign for its direction, got {}",
                    kind, t.warning
                ));
            }

            if critical < warning {
                return Err(format!(
                    "{}: critical threshold must be at least as far out as warning \
                     (warning={}, critical={})",
                    kind, t.warning, t.critical
                ));
            }
        }

        if let Some(floor) = self.info_floor {
            if !(floor >= 0.0 && floor.is_finite()) {
                return Err(format!("info_floor must be non-negative, got {}", floor));
            }
        }

        if !(self.improvement_floor >= 0.0 && self.improvement_floor.is_finite()) {
            return Err(format!(
                "improvement_floor must be non-negative, got {}",
                self.improvement_floor
            ));
        }

        Ok(())
    }
}
