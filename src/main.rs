use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bpa_core::constants::CONFIG_PATH_ENV;
use bpa_core::{AlertEvaluator, AlertVector, PatientId, load_config};
use bpa_readings::{ReadingLog, parse_timestamp};

#[derive(Parser)]
#[command(name = "bpa")]
#[command(about = "Blood pressure alert evaluation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate alerts for one patient
    Evaluate {
        /// CSV reading log with ID, TimeStamp and BloodPressure columns
        file: PathBuf,
        /// Patient identifier as it appears in the ID column
        patient_id: String,
        /// Evaluation instant (defaults to the current time)
        #[arg(long)]
        now: Option<String>,
        /// YAML alert configuration (defaults to $BPA_CONFIG, then built-in limits)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Evaluate alerts for every patient in a log, one JSON line each
    EvaluateAll {
        /// CSV reading log
        file: PathBuf,
        /// Evaluation instant (defaults to the current time)
        #[arg(long)]
        now: Option<String>,
        /// YAML alert configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List the patients found in a log
    Patients {
        /// CSV reading log
        file: PathBuf,
    },
    /// Print the effective alert configuration
    ShowConfig {
        /// YAML alert configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// One line of evaluation output.
#[derive(Serialize)]
struct PatientAlerts<'a> {
    patient_id: &'a PatientId,
    #[serde(flatten)]
    alerts: AlertVector,
}

/// Entry point for the `bpa` command-line tool.
///
/// Loads `.env`, installs logging on stderr, and dispatches the subcommand. Results are
/// written to stdout as JSON so they can be piped into other tools.
///
/// # Environment Variables
/// - `BPA_CONFIG`: YAML configuration file used when `--config` is not given
/// - `RUST_LOG`: log filter (default directive: `bpa=info`)
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("bpa=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Evaluate {
            file,
            patient_id,
            now,
            config,
        }) => {
            let evaluator = build_evaluator(config)?;
            let now = resolve_now(now.as_deref())?;
            let log = read_log(&file)?;
            let patient_id = PatientId::new(&patient_id).context("invalid patient id")?;

            let alerts = evaluator
                .evaluate(log.readings(), &patient_id, now)
                .with_context(|| format!("failed to evaluate patient {patient_id}"))?;
            print_alerts(&patient_id, alerts)?;
        }
        Some(Commands::EvaluateAll { file, now, config }) => {
            let evaluator = build_evaluator(config)?;
            let now = resolve_now(now.as_deref())?;
            let log = read_log(&file)?;

            let mut failures = 0usize;
            let mut alerted = 0usize;
            for patient_id in log.patient_ids() {
                match evaluator.evaluate(log.readings(), &patient_id, now) {
                    Ok(alerts) => {
                        if alerts.any() {
                            alerted += 1;
                        }
                        print_alerts(&patient_id, alerts)?;
                    }
                    Err(e) => {
                        failures += 1;
                        tracing::error!("failed to evaluate patient {}: {}", patient_id, e);
                    }
                }
            }
            tracing::info!("{} patient(s) with at least one alert", alerted);
            if failures > 0 {
                anyhow::bail!("{failures} patient(s) could not be evaluated");
            }
        }
        Some(Commands::Patients { file }) => {
            let log = read_log(&file)?;
            let patients = log.patient_ids();
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                for patient_id in patients {
                    println!("{patient_id}");
                }
            }
        }
        Some(Commands::ShowConfig { config }) => {
            let evaluator = build_evaluator(config)?;
            print!("{}", evaluator.config().to_yaml_string()?);
        }
        None => {
            println!("Use 'bpa --help' for commands");
        }
    }

    Ok(())
}

/// Resolves configuration once at startup: `--config`, then `$BPA_CONFIG`, then defaults.
fn build_evaluator(config: Option<PathBuf>) -> anyhow::Result<AlertEvaluator> {
    let path = config.or_else(|| {
        std::env::var(CONFIG_PATH_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    });

    let cfg = load_config(path.as_deref()).context("failed to load alert configuration")?;
    Ok(AlertEvaluator::new(cfg)?)
}

fn read_log(file: &Path) -> anyhow::Result<ReadingLog> {
    ReadingLog::from_path(file)
        .with_context(|| format!("failed to read reading log {}", file.display()))
}

/// The wall clock is read here and nowhere else; the engine only ever sees `now` as a value.
fn resolve_now(value: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match value {
        Some(value) => parse_timestamp(value)
            .with_context(|| format!("unrecognised --now value '{value}'")),
        None => Ok(Utc::now()),
    }
}

fn print_alerts(patient_id: &PatientId, alerts: AlertVector) -> anyhow::Result<()> {
    let line = serde_json::to_string(&PatientAlerts { patient_id, alerts })?;
    println!("{line}");
    Ok(())
}
