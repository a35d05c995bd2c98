use crate::{
    error::ProcessError,
    model::SettlementReport,
    ports::{LedgerSource, TableSource},
};
use tripsplit_domain::{
    ActuallyPaidAggregator, ActuallyPaidEntry, ItemRecord, Money, SettlementEngine,
    ShouldPayAggregator, ShouldPayEntry, actually_paid_from_table, should_pay_from_table,
};

/// Runs the aggregation and settlement pipeline over a ledger or over aggregate tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct TripProcessor {
    engine: SettlementEngine,
}

impl TripProcessor {
    pub fn new(engine: SettlementEngine) -> Self {
        Self { engine }
    }

    pub fn settle_items(&self, items: &[ItemRecord]) -> SettlementReport {
        let should_pay = ShouldPayAggregator::aggregate(items);
        let actually_paid = ActuallyPaidAggregator::aggregate(items);
        tracing::debug!(
            item_count = items.len(),
            consumer_count = should_pay.len(),
            payer_count = actually_paid.len(),
            "Ledger aggregated"
        );
        self.build_report(should_pay, actually_paid)
    }

    pub fn settle_ledger(
        &self,
        ledger: &dyn LedgerSource,
    ) -> Result<SettlementReport, ProcessError> {
        let items = ledger.load_items()?;
        Ok(self.settle_items(&items))
    }

    /// Settles precomputed aggregates. Schema problems surface as
    /// [`tripsplit_domain::SettlementError::Schema`].
    pub fn settle_tables(
        &self,
        should_pay: &dyn TableSource,
        actually_paid: &dyn TableSource,
    ) -> Result<SettlementReport, ProcessError> {
        let should_pay = should_pay_from_table(&should_pay.load_table()?)?;
        let actually_paid = actually_paid_from_table(&actually_paid.load_table()?)?;
        Ok(self.build_report(should_pay, actually_paid))
    }

    fn build_report(
        &self,
        should_pay: Vec<ShouldPayEntry>,
        actually_paid: Vec<ActuallyPaidEntry>,
    ) -> SettlementReport {
        let balances = self.engine.net_balances(&should_pay, &actually_paid);
        let transfers = self.engine.settle_balances(&balances);
        let residual: Money = balances.iter().map(|person| person.balance).sum();

        if residual.abs() > self.engine.policy().tolerance {
            let total_should_pay: Money = should_pay.iter().map(|e| e.should_pay).sum();
            let total_actually_paid: Money = actually_paid.iter().map(|e| e.actually_paid).sum();
            tracing::warn!(
                total_should_pay = %total_should_pay,
                total_actually_paid = %total_actually_paid,
                residual = %residual,
                "Unbalanced ledger; the residual is left unsettled"
            );
        }

        tracing::info!(
            participant_count = balances.len(),
            transfer_count = transfers.len(),
            "Settlement computed"
        );

        SettlementReport {
            should_pay,
            actually_paid,
            balances,
            transfers,
            residual,
        }
    }
}
