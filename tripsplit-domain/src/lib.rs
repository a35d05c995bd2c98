#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;
pub mod table;

pub use model::{
    ActuallyPaidEntry, ItemRecord, Money, PersonBalance, RoundingMode, ShouldPayEntry, Transfer,
};
pub use services::{
    ActuallyPaidAggregator, SettlementEngine, SettlementError, SettlementPolicy,
    ShouldPayAggregator, actually_paid_from_table, should_pay_from_table, transfers_to_table,
};
pub use table::{SchemaError, Table, Value};
