pub mod actually_paid_aggregator;
pub mod settlement_engine;
pub mod should_pay_aggregator;

pub use actually_paid_aggregator::ActuallyPaidAggregator;
pub use settlement_engine::{
    SettlementEngine, SettlementError, SettlementPolicy, actually_paid_from_table,
    should_pay_from_table, transfers_to_table,
};
pub use should_pay_aggregator::ShouldPayAggregator;
