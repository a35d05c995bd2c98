use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "tripsplit", version, about = "Settle shared trip expenses")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format.
    #[arg(
        long,
        global = true,
        value_enum,
        env = "TRIPSPLIT_FORMAT",
        default_value_t = OutputFormat::Text
    )]
    pub format: OutputFormat,

    /// Rounding applied to transfer amounts.
    #[arg(
        long,
        global = true,
        value_enum,
        env = "TRIPSPLIT_ROUNDING",
        default_value_t = Rounding::HalfUp
    )]
    pub rounding: Rounding,

    /// Write the result to this file instead of stdout.
    #[arg(long, short, global = true, env = "TRIPSPLIT_OUTPUT")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Settle a trip from its item ledger CSV.
    Settle {
        /// CSV with payer,item_name,item_price,shared_by,tax_pct,tip_pct columns.
        ledger: PathBuf,

        #[arg(long, env = "TRIPSPLIT_TAX_MIN")]
        tax_min: Option<Decimal>,
        #[arg(long, env = "TRIPSPLIT_TAX_MAX")]
        tax_max: Option<Decimal>,
        #[arg(long, env = "TRIPSPLIT_TIP_MIN")]
        tip_min: Option<Decimal>,
        #[arg(long, env = "TRIPSPLIT_TIP_MAX")]
        tip_max: Option<Decimal>,
    },
    /// Settle precomputed should-pay and actually-paid tables.
    SettleTables {
        /// CSV with name,should_pay columns.
        #[arg(long)]
        should_pay: PathBuf,
        /// CSV with name,actually_paid columns.
        #[arg(long)]
        actually_paid: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable balance and transfer tables.
    Text,
    /// The transfer table as CSV (sender,receiver,amount).
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Rounding {
    HalfUp,
    HalfEven,
}
