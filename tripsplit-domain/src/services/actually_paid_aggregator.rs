use crate::{
    model::{ActuallyPaidEntry, ItemRecord, Money},
    table::{self, Table, Value},
};
use indexmap::IndexMap;

/// Totals what each payer spent, tax and tip included.
pub struct ActuallyPaidAggregator;

impl ActuallyPaidAggregator {
    /// One entry per distinct payer, in order of first appearance.
    pub fn aggregate(items: &[ItemRecord]) -> Vec<ActuallyPaidEntry> {
        let mut totals: IndexMap<&str, Money> = IndexMap::new();
        for item in items {
            *totals.entry(item.payer.as_str()).or_default() += item.total_cost();
        }

        totals
            .into_iter()
            .map(|(name, actually_paid)| ActuallyPaidEntry::new(name, actually_paid))
            .collect()
    }

    pub fn to_table(entries: &[ActuallyPaidEntry]) -> Table {
        let mut out = Table::with_columns("actually_paid", &[table::NAME, table::ACTUALLY_PAID]);
        for entry in entries {
            out.push_row(vec![
                Value::Text(entry.name.clone()),
                Value::Number(entry.actually_paid),
            ]);
        }
        out
    }
}
