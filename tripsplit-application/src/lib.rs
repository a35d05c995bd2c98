#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod ports;
pub mod trip_processor;

pub use error::{LedgerSourceError, ProcessError};
pub use model::SettlementReport;
pub use ports::{LedgerSource, TableSource};
pub use trip_processor::TripProcessor;
