use tripsplit_application::{LedgerSourceError, ProcessError};
use tripsplit_domain::SettlementError;

pub fn format_process_error(error: &ProcessError) -> String {
    match error {
        ProcessError::Ledger(LedgerSourceError::Unreadable { location, detail }) => {
            format!("Could not read {location}: {detail}")
        }
        ProcessError::Ledger(LedgerSourceError::MissingColumns { location, columns }) => {
            format!(
                "{location} is missing required column(s): {}",
                columns.join(", ")
            )
        }
        ProcessError::Ledger(LedgerSourceError::InvalidRecord {
            location,
            row,
            detail,
        }) => format!("Invalid record in {location} (row {row}): {detail}"),
        ProcessError::Settlement(SettlementError::Schema(schema)) => {
            format!(
                "Table '{}' is missing required column(s): {}",
                schema.table,
                schema.missing.join(", ")
            )
        }
        ProcessError::Settlement(
            err @ (SettlementError::InvalidValue { .. } | SettlementError::AmountOutOfRange { .. }),
        ) => err.to_string(),
    }
}
