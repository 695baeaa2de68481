// Regression report: severity buckets, console rendering and the JSON file
// consumed by CI.

use crate::error::Result;
use crate::regression::comparator::{RegressionResult, Severity};
use crate::snapshot::write_json;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Regressions bucketed by severity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegressionSet {
    pub critical: Vec<RegressionResult>,
    pub warning: Vec<RegressionResult>,
    pub info: Vec<RegressionResult>,
}

impl RegressionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a result under its own severity
    pub fn push(&mut self, result: RegressionResult) {
        match result.severity {
            Severity::Critical => self.critical.push(result),
            Severity::Warning => self.warning.push(result),
            Severity::Info => self.info.push(result),
        }
    }

    pub fn bucket(&self, severity: Severity) -> &[RegressionResult] {
        match severity {
            Severity::Critical => &self.critical,
            Severity::Warning => &self.warning,
            Severity::Info => &self.info,
        }
    }

    pub fn total(&self) -> usize {
        self.critical.len() + self.warning.len() + self.info.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Whether the calling process must exit non-zero
    pub fn has_critical_regressions(&self) -> bool {
        !self.critical.is_empty()
    }

    /// All results, critical first
    pub fn iter(&self) -> impl Iterator<Item = &RegressionResult> {
        Severity::ALL
            .into_iter()
            .flat_map(move |severity| self.bucket(severity).iter())
    }

    pub fn to_report(&self) -> RegressionReport {
        RegressionReport {
            total_regressions: self.total(),
            by_severity: SeverityCounts {
                critical: self.critical.len(),
                warning: self.warning.len(),
                info: self.info.len(),
            },
            regressions: self.iter().cloned().collect(),
        }
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let rule = "=".repeat(80);
        let mut report = String::new();

        if self.is_empty() {
            report.push_str(&format!("\n{}\n", rule));
            report.push_str("✅ NO REGRESSIONS DETECTED\n");
            report.push_str(&format!("{}\n", rule));
            return report;
        }

        report.push_str(&format!("\n{}\n", rule));
        report.push_str(&format!(
            "⚠️  REGRESSIONS DETECTED: {} total\n",
            self.total()
        ));
        report.push_str(&format!("{}\n", rule));

        for severity in Severity::ALL {
            let bucket = self.bucket(severity);
            if bucket.is_empty() {
                continue;
            }

            let marker = match severity {
                Severity::Critical => "🔴",
                Severity::Warning => "🟡",
                Severity::Info => "ℹ️",
            };
            report.push_str(&format!(
                "\n{} {} ({})\n",
                marker,
                severity.as_str().to_uppercase(),
                bucket.len()
            ));
            report.push_str(&format!("{}\n", "-".repeat(80)));

            for reg in bucket {
                let direction = if reg.change_percent > 0.0 { "↑" } else { "↓" };
                report.push_str(&format!("\n  {}:\n", reg.metric_name));
                report.push_str(&format!("    Baseline: {:.4}\n", reg.baseline_value));
                report.push_str(&format!("    Current:  {:.4}\n", reg.current_value));
                report.push_str(&format!(
                    "    Change:   {} {:.1}%\n",
                    direction,
                    reg.change_percent.abs()
                ));
                report.push_str(&format!(
                    "    Exceeded threshold by: {:.1}%\n",
                    reg.threshold_exceeded
                ));
            }
        }

        report.push_str(&format!("\n{}\n", rule));
        report
    }

    pub fn print_report(&self) {
        print!("{}", self.to_report_string());
    }

    /// Write the JSON report, creating parent directories
    pub fn save_report(&self, output_path: &Path) -> Result<()> {
        write_json(output_path, &self.to_report(), "regression report")?;
        tracing::info!("Regression report saved to {}", output_path.display());
        Ok(())
    }
}

impl FromIterator<RegressionResult> for RegressionSet {
    fn from_iter<I: IntoIterator<Item = RegressionResult>>(iter: I) -> Self {
        let mut set = Self::new();
        for result in iter {
            set.push(result);
        }
        set
    }
}

/// Per-severity counts in the report file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

/// Machine-readable regression report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    pub total_regressions: usize,
    pub by_severity: SeverityCounts,
    pub regressions: Vec<RegressionResult>,
}

impl RegressionReport {
    pub fn has_critical_regressions(&self) -> bool {
        self.by_severity.critical > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, severity: Severity, change_percent: f64) -> RegressionResult {
        RegressionResult {
            metric_name: name.to_string(),
            severity,
            baseline_value: 1.0,
            current_value: 1.0 + change_percent / 100.0,
            change_percent,
            threshold_exceeded: 1.5,
        }
    }

    #[test]
    fn test_push_buckets_by_severity() {
        let set: RegressionSet = [
            result("stt_wer_clean", Severity::Critical, 40.0),
            result("backchannel_accuracy", Severity::Warning, -7.0),
            result("tts_latency_ms", Severity::Info, 12.0),
            result("stt_latency_ms", Severity::Critical, 35.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.critical.len(), 2);
        assert_eq!(set.warning.len(), 1);
        assert_eq!(set.info.len(), 1);
        assert_eq!(set.total(), 4);
        assert!(set.has_critical_regressions());

        let order: Vec<Severity> = set.iter().map(|r| r.severity).collect();
        assert_eq!(
            order,
            vec![
                Severity::Critical,
                Severity::Critical,
                Severity::Warning,
                Severity::Info
            ]
        );
    }

    #[test]
    fn test_empty_set() {
        let set = RegressionSet::new();
        assert!(set.is_empty());
        assert!(!set.has_critical_regressions());
        assert!(set.to_report_string().contains("NO REGRESSIONS DETECTED"));

        let report = set.to_report();
        assert_eq!(report.total_regressions, 0);
        assert_eq!(report.by_severity, SeverityCounts::default());
    }

    #[test]
    fn test_warning_only_is_not_critical() {
        let set: RegressionSet = [result("pesq", Severity::Warning, -6.0)]
            .into_iter()
            .collect();
        assert!(!set.has_critical_regressions());
        assert!(!set.to_report().has_critical_regressions());
    }

    #[test]
    fn test_report_string_lists_metrics() {
        let set: RegressionSet = [
            result("stt_wer_clean", Severity::Critical, 40.0),
            result("backchannel_accuracy", Severity::Warning, -7.8),
        ]
        .into_iter()
        .collect();

        let text = set.to_report_string();
        assert!(text.contains("REGRESSIONS DETECTED: 2 total"));
        assert!(text.contains("CRITICAL (1)"));
        assert!(text.contains("WARNING (1)"));
        assert!(!text.contains("INFO"));
        assert!(text.contains("stt_wer_clean"));
        assert!(text.contains("↑ 40.0%"));
        assert!(text.contains("↓ 7.8%"));
    }

    #[test]
    fn test_report_json_schema() {
        let set: RegressionSet = [result("stt_wer_clean", Severity::Critical, 40.0)]
            .into_iter()
            .collect();
        let json = serde_json::to_value(set.to_report()).unwrap();

        assert_eq!(json["total_regressions"], 1);
        assert_eq!(json["by_severity"]["critical"], 1);
        assert_eq!(json["by_severity"]["warning"], 0);
        assert_eq!(json["by_severity"]["info"], 0);

        let entry = &json["regressions"][0];
        assert_eq!(entry["metric_name"], "stt_wer_clean");
        assert_eq!(entry["severity"], "critical");
        assert_eq!(entry["change_percent"], 40.0);
        for key in ["baseline_value", "current_value", "threshold_exceeded"] {
            assert!(entry.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_save_report_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/regression_report.json");

        let set: RegressionSet = [result("pesq", Severity::Warning, -6.0)]
            .into_iter()
            .collect();
        set.save_report(&path).unwrap();

        let loaded: RegressionReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, set.to_report());
    }
}
