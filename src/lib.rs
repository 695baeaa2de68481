//! voicegate - quality-regression gate for voice-AI test suites
//!
//! This library aggregates numeric test measurements (latency, word error
//! rate, accuracy, speech quality) into run snapshots and compares a current
//! run against a stored baseline with direction-aware, per-metric-type
//! thresholds.

pub mod alert;
pub mod cli;
pub mod collector;
pub mod error;
pub mod metric_kind;
pub mod regression;
pub mod snapshot;
pub mod stats;
pub mod thresholds;

pub use error::{GateError, Result};
