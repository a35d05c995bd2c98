use crate::cli::{Cli, Command, OutputFormat, Rounding};
use anyhow::{Context, bail};
use rust_decimal::Decimal;
use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;
use tripsplit_application::{SettlementReport, TripProcessor};
use tripsplit_domain::{RoundingMode, SettlementEngine, SettlementPolicy, transfers_to_table};
use tripsplit_infrastructure::{CsvLedgerSource, CsvTableSource, CsvTableWriter, ValidationLimits};
use tripsplit_presentation::{SettlementPresenter, format_process_error};

const LOG_ENV: &str = "TRIPSPLIT_LOG";

/// What to settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Ledger {
        path: PathBuf,
        limits: ValidationLimits,
    },
    Tables {
        should_pay: PathBuf,
        actually_paid: PathBuf,
    },
}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub input: Input,
    pub format: OutputFormat,
    pub policy: SettlementPolicy,
    pub output: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let rounding_mode = match cli.rounding {
            Rounding::HalfUp => RoundingMode::HalfUp,
            Rounding::HalfEven => RoundingMode::HalfEven,
        };
        let policy = SettlementPolicy {
            rounding_mode,
            ..SettlementPolicy::default()
        };

        let input = match cli.command {
            Command::Settle {
                ledger,
                tax_min,
                tax_max,
                tip_min,
                tip_max,
            } => {
                let defaults = ValidationLimits::default();
                let tax_pct = bounded("tax", tax_min, tax_max, &defaults.tax_pct)?;
                let tip_pct = bounded("tip", tip_min, tip_max, &defaults.tip_pct)?;
                let limits = ValidationLimits {
                    tax_pct,
                    tip_pct,
                    ..defaults
                };
                Input::Ledger {
                    path: ledger,
                    limits,
                }
            }
            Command::SettleTables {
                should_pay,
                actually_paid,
            } => Input::Tables {
                should_pay,
                actually_paid,
            },
        };

        Ok(Self {
            input,
            format: cli.format,
            policy,
            output: cli.output,
        })
    }
}

fn bounded(
    label: &str,
    min: Option<Decimal>,
    max: Option<Decimal>,
    default: &std::ops::RangeInclusive<Decimal>,
) -> anyhow::Result<std::ops::RangeInclusive<Decimal>> {
    let min = min.unwrap_or(*default.start());
    let max = max.unwrap_or(*default.end());
    if min > max {
        bail!("{label} range is empty: minimum {min} exceeds maximum {max}");
    }
    Ok(min..=max)
}

/// Installs the stderr subscriber; `TRIPSPLIT_LOG` wins over `RUST_LOG`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

pub fn compute_report(config: &AppConfig) -> anyhow::Result<SettlementReport> {
    let processor = TripProcessor::new(SettlementEngine::with_policy(config.policy));
    let result = match &config.input {
        Input::Ledger { path, limits } => {
            let ledger = CsvLedgerSource::new(path).with_limits(limits.clone());
            processor.settle_ledger(&ledger)
        }
        Input::Tables {
            should_pay,
            actually_paid,
        } => processor.settle_tables(
            &CsvTableSource::new(should_pay).named("should_pay"),
            &CsvTableSource::new(actually_paid).named("actually_paid"),
        ),
    };
    result.map_err(|err| anyhow::anyhow!(format_process_error(&err)))
}

pub fn write_report(
    config: &AppConfig,
    report: &SettlementReport,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match config.format {
        OutputFormat::Text => {
            let view = SettlementPresenter::render(report, config.policy.tolerance);
            out.write_all(view.to_text().as_bytes())?;
        }
        OutputFormat::Csv => {
            CsvTableWriter::write(&transfers_to_table(&report.transfers), &mut *out)
                .context("failed to write transfers as CSV")?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Runs one settlement end to end.
pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let report = compute_report(config)?;

    match &config.output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("failed to create '{}'", path.display()))?;
            write_report(config, &report, &mut file)?;
            tracing::info!(path = %path.display(), "Settlement written");
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write_report(config, &report, &mut lock)?;
        }
    }
    Ok(())
}
