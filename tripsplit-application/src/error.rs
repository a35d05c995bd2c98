use thiserror::Error;
use tripsplit_domain::SettlementError;

/// Failure reported by a [`crate::ports::LedgerSource`] or [`crate::ports::TableSource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerSourceError {
    #[error("failed to read {location}: {detail}")]
    Unreadable { location: String, detail: String },
    #[error("{location} must have columns {}", .columns.join(", "))]
    MissingColumns {
        location: String,
        columns: Vec<String>,
    },
    #[error("{location}, row {row}: {detail}")]
    InvalidRecord {
        location: String,
        row: usize,
        detail: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Ledger(#[from] LedgerSourceError),
    #[error(transparent)]
    Settlement(#[from] SettlementError),
}
