use crate::{
    model::{ItemRecord, Money, ShouldPayEntry},
    table::{self, Table, Value},
};
use indexmap::IndexMap;

/// Splits every item evenly among its sharers and totals each consumer's part.
pub struct ShouldPayAggregator;

impl ShouldPayAggregator {
    /// One entry per distinct sharer, in order of first appearance.
    pub fn aggregate(items: &[ItemRecord]) -> Vec<ShouldPayEntry> {
        let mut totals: IndexMap<&str, Money> = IndexMap::new();
        for item in items {
            let share = item.share_per_person();
            for sharer in &item.shared_by {
                *totals.entry(sharer.as_str()).or_default() += share;
            }
        }

        totals
            .into_iter()
            .map(|(name, should_pay)| ShouldPayEntry::new(name, should_pay))
            .collect()
    }

    pub fn to_table(entries: &[ShouldPayEntry]) -> Table {
        let mut out = Table::with_columns("should_pay", &[table::NAME, table::SHOULD_PAY]);
        for entry in entries {
            out.push_row(vec![
                Value::Text(entry.name.clone()),
                Value::Number(entry.should_pay),
            ]);
        }
        out
    }
}
