//! Alerting boundary: where a regression report leaves the gate
//!
//! Delivery to chat webhooks or paging systems belongs to external
//! collaborators implementing [`AlertSink`]. The gate ships only a console
//! sink.

use crate::error::{GateError, Result};
use crate::regression::RegressionSet;
use std::io::Write;

/// Receives alert notifications
pub trait AlertSink {
    fn send(&self, title: &str, details: &serde_json::Value) -> Result<()>;
}

/// Writes alerts as a title line plus pretty-printed JSON
pub struct ConsoleAlert<W: Write> {
    writer: std::sync::Mutex<W>,
}

impl ConsoleAlert<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write> ConsoleAlert<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: std::sync::Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<W: Write> AlertSink for ConsoleAlert<W> {
    fn send(&self, title: &str, details: &serde_json::Value) -> Result<()> {
        let body = serde_json::to_string_pretty(details).map_err(|source| GateError::Serialize {
            what: "alert details",
            source,
        })?;

        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        writeln!(writer, "\n⚠️  ALERT: {}\n{}", title, body).map_err(|source| GateError::Write {
            path: "<alert sink>".into(),
            source,
        })
    }
}

/// Forward a non-empty regression set to `sink`
///
/// Returns whether an alert was sent.
pub fn alert_on_regressions(sink: &dyn AlertSink, regressions: &RegressionSet) -> Result<bool> {
    if regressions.is_empty() {
        return Ok(false);
    }

    let report = regressions.to_report();
    let title = format!(
        "{} quality regression(s) detected ({} critical)",
        report.total_regressions, report.by_severity.critical
    );
    let details = serde_json::to_value(&report).map_err(|source| GateError::Serialize {
        what: "regression report",
        source,
    })?;

    sink.send(&title, &details)?;
    Ok(true)
}
