use crate::error::LedgerSourceError;
use tripsplit_domain::{ItemRecord, Table};

/// Provides validated item records of a trip.
pub trait LedgerSource: Send + Sync {
    fn load_items(&self) -> Result<Vec<ItemRecord>, LedgerSourceError>;
}

/// Provides precomputed aggregate tables (should-pay or actually-paid).
pub trait TableSource: Send + Sync {
    fn load_table(&self) -> Result<Table, LedgerSourceError>;
}

impl LedgerSource for Vec<ItemRecord> {
    fn load_items(&self) -> Result<Vec<ItemRecord>, LedgerSourceError> {
        Ok(self.clone())
    }
}

impl TableSource for Table {
    fn load_table(&self) -> Result<Table, LedgerSourceError> {
        Ok(self.clone())
    }
}
