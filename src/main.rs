use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use voicegate::alert::{alert_on_regressions, ConsoleAlert};
use voicegate::cli::{Cli, OutputFormat};
use voicegate::regression::{DetectorConfig, MalformedPolicy, RegressionDetector};
use voicegate::thresholds::ThresholdTable;

/// Exit status when at least one critical regression was found
const EXIT_CRITICAL: u8 = 1;

/// Exit status for configuration or I/O failures
const EXIT_ERROR: u8 = 2;

/// Initialize tracing subscriber; notices go to stderr
fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::TRACE
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

/// Run detection and return whether a critical regression was found
fn run(args: Cli) -> Result<bool> {
    let thresholds = match &args.thresholds {
        Some(path) => ThresholdTable::from_file(path)
            .with_context(|| format!("loading thresholds from {}", path.display()))?,
        None => ThresholdTable::default(),
    };

    let config = DetectorConfig {
        statistic: args.statistic,
        recursive: args.recursive,
        on_malformed: if args.skip_malformed {
            MalformedPolicy::Skip
        } else {
            MalformedPolicy::Abort
        },
        ..DetectorConfig::new(&args.baseline_dir, &args.current_dir)
    };

    eprintln!("Baseline dir: {}", config.baseline_dir.display());
    eprintln!("Current dir:  {}", config.current_dir.display());

    let detector = RegressionDetector::with_config(config, thresholds)?;
    let regressions = detector
        .detect_regressions()
        .context("regression detection failed")?;
    let critical = regressions.has_critical_regressions();

    // Past this point a failure must not mask a critical verdict
    let publish = || -> Result<()> {
        match args.format {
            OutputFormat::Text => regressions.print_report(),
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&regressions.to_report())?)
            }
        }

        let report_path = args
            .report
            .clone()
            .unwrap_or_else(|| detector.default_report_path());
        regressions.save_report(&report_path)?;

        if args.alert {
            alert_on_regressions(&ConsoleAlert::stderr(), &regressions)?;
        }
        Ok(())
    };

    match publish() {
        Err(err) if critical => tracing::error!("{:#}", err),
        other => other?,
    }

    Ok(critical)
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing(args.debug);

    match run(args) {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(EXIT_CRITICAL),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
