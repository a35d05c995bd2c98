use tripsplit_domain::{ActuallyPaidEntry, Money, PersonBalance, ShouldPayEntry, Transfer};

/// Everything computed for one settlement run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementReport {
    pub should_pay: Vec<ShouldPayEntry>,
    pub actually_paid: Vec<ActuallyPaidEntry>,
    /// Per participant, sorted by name.
    pub balances: Vec<PersonBalance>,
    pub transfers: Vec<Transfer>,
    /// Total paid minus total owed; non-zero when the ledger does not balance.
    pub residual: Money,
}

impl SettlementReport {
    /// No transfers remain and the ledger balances within `tolerance`.
    pub fn is_settled(&self, tolerance: Money) -> bool {
        self.transfers.is_empty() && self.residual.abs() <= tolerance
    }

    pub fn total_transferred(&self) -> Money {
        self.transfers.iter().map(|transfer| transfer.amount).sum()
    }
}
