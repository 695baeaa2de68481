//! CLI argument parsing for voicegate

use crate::regression::{Statistic, DEFAULT_BASELINE_DIR, DEFAULT_CURRENT_DIR};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the regression report on stdout
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "voicegate")]
#[command(version)]
#[command(about = "Quality-regression gate for voice-AI test metrics", long_about = None)]
pub struct Cli {
    /// Directory holding the baseline *_metrics.json snapshots
    #[arg(value_name = "BASELINE_DIR", default_value = DEFAULT_BASELINE_DIR)]
    pub baseline_dir: PathBuf,

    /// Directory holding the current run's *_metrics.json snapshots
    #[arg(value_name = "CURRENT_DIR", default_value = DEFAULT_CURRENT_DIR)]
    pub current_dir: PathBuf,

    /// TOML file overriding the default threshold table
    #[arg(short = 't', long = "thresholds", value_name = "FILE")]
    pub thresholds: Option<PathBuf>,

    /// Where to write the JSON report (default: CURRENT_DIR/regression_report.json)
    #[arg(short = 'o', long = "report", value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Summary statistic to compare
    #[arg(long = "statistic", value_enum, default_value = "mean")]
    pub statistic: Statistic,

    /// Scan sub-directories of CURRENT_DIR as well
    #[arg(short = 'r', long = "recursive")]
    pub recursive: bool,

    /// Skip unparseable snapshot files instead of failing
    #[arg(long = "skip-malformed")]
    pub skip_malformed: bool,

    /// Report format on stdout
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Print an alert to stderr when any regression is found
    #[arg(long = "alert")]
    pub alert: bool,

    /// Enable trace-level logging
    #[arg(long = "debug")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["voicegate"]);
        assert_eq!(cli.baseline_dir, PathBuf::from("tests/baseline"));
        assert_eq!(cli.current_dir, PathBuf::from("tests/results"));
        assert!(cli.thresholds.is_none());
        assert!(cli.report.is_none());
        assert_eq!(cli.statistic, Statistic::Mean);
        assert!(!cli.recursive);
        assert!(!cli.skip_malformed);
        assert!(matches!(cli.format, OutputFormat::Text));
        assert!(!cli.alert);
    }

    #[test]
    fn test_cli_positional_dirs() {
        let cli = Cli::parse_from(["voicegate", "golden", "out"]);
        assert_eq!(cli.baseline_dir, PathBuf::from("golden"));
        assert_eq!(cli.current_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_cli_baseline_only() {
        let cli = Cli::parse_from(["voicegate", "golden"]);
        assert_eq!(cli.baseline_dir, PathBuf::from("golden"));
        assert_eq!(cli.current_dir, PathBuf::from("tests/results"));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "voicegate",
            "--thresholds",
            "gate.toml",
            "--report",
            "out/report.json",
            "--statistic",
            "p95",
            "--recursive",
            "--skip-malformed",
            "--format",
            "json",
            "--alert",
            "b",
            "c",
        ]);
        assert_eq!(cli.thresholds, Some(PathBuf::from("gate.toml")));
        assert_eq!(cli.report, Some(PathBuf::from("out/report.json")));
        assert_eq!(cli.statistic, Statistic::P95);
        assert!(cli.recursive);
        assert!(cli.skip_malformed);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(cli.alert);
    }

    #[test]
    fn test_cli_rejects_unknown_statistic() {
        assert!(Cli::try_parse_from(["voicegate", "--statistic", "p42"]).is_err());
    }
}
