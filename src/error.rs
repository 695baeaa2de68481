//! Error types for snapshot persistence and threshold configuration
//!
//! Skip conditions during comparison (missing baseline, zero baseline,
//! unclassified metric) are policy and never surface here.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the collector, the detector and threshold loading
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed snapshot {}", path.display())]
    MalformedSnapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize {what}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse threshold file {}", path.display())]
    ThresholdParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid threshold configuration: {0}")]
    InvalidThresholds(String),
}

/// Result type for voicegate operations
pub type Result<T> = std::result::Result<T, GateError>;
