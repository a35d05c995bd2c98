#![warn(clippy::uninlined_format_args)]

pub mod csv_ledger;
pub mod csv_table;

pub use csv_ledger::{CsvLedgerSource, LedgerError, ValidationLimits};
pub use csv_table::{CsvTableSource, CsvTableWriter};
