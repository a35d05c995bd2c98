//! Greedy debt settlement.
//!
//! Balances are netted per participant and then settled by repeatedly matching
//! the largest remaining creditor with the largest remaining debtor. Each
//! round fully settles at least one of the two, so the number of rounds is
//! bounded by the number of parties with a non-trivial balance.

use crate::{
    model::{ActuallyPaidEntry, Money, PersonBalance, RoundingMode, ShouldPayEntry, Transfer},
    table::{self, SchemaError, Table, Value},
};
use std::collections::BTreeMap;
use thiserror::Error;

/// Parameters for matching and quantizing transfers.
///
/// # Example
/// ```
/// use tripsplit_domain::{Money, RoundingMode, SettlementPolicy};
///
/// let policy = SettlementPolicy {
///     rounding_mode: RoundingMode::HalfEven,
///     ..SettlementPolicy::default()
/// };
/// assert_eq!(policy.tolerance, Money::CENT);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementPolicy {
    /// Balances whose magnitude does not exceed this are treated as settled.
    pub tolerance: Money,
    /// Decimal places of emitted transfer amounts.
    pub scale: u32,
    pub rounding_mode: RoundingMode,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            tolerance: Money::CENT,
            scale: 2,
            rounding_mode: RoundingMode::HalfUp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("{table}: column '{column}' in row {row} is not numeric (found '{found}')")]
    InvalidValue {
        table: String,
        column: &'static str,
        row: usize,
        found: String,
    },
    #[error("{table}: column '{column}' in row {row} exceeds {max} (found {found})")]
    AmountOutOfRange {
        table: String,
        column: &'static str,
        row: usize,
        found: Money,
        max: Money,
    },
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SettlementEngine {
    policy: SettlementPolicy,
}

impl SettlementEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SettlementPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SettlementPolicy {
        self.policy
    }

    /// Outer-joins both inputs on name and nets them, sorted by name.
    ///
    /// A person present on one side only counts as zero on the other. Repeated
    /// names on the same side accumulate.
    pub fn net_balances(
        &self,
        should_pay: &[ShouldPayEntry],
        actually_paid: &[ActuallyPaidEntry],
    ) -> Vec<PersonBalance> {
        let mut joined: BTreeMap<&str, (Money, Money)> = BTreeMap::new();
        for entry in should_pay {
            joined.entry(entry.name.as_str()).or_default().0 += entry.should_pay;
        }
        for entry in actually_paid {
            joined.entry(entry.name.as_str()).or_default().1 += entry.actually_paid;
        }

        joined
            .into_iter()
            .map(|(name, (should_pay, actually_paid))| PersonBalance {
                name: name.to_string(),
                should_pay,
                actually_paid,
                balance: actually_paid - should_pay,
            })
            .collect()
    }

    pub fn settle(
        &self,
        should_pay: &[ShouldPayEntry],
        actually_paid: &[ActuallyPaidEntry],
    ) -> Vec<Transfer> {
        self.settle_balances(&self.net_balances(should_pay, actually_paid))
    }

    /// Matches creditors against debtors; ties resolve to the earliest party in `balances`.
    pub fn settle_balances(&self, balances: &[PersonBalance]) -> Vec<Transfer> {
        let tolerance = self.policy.tolerance;

        let mut creditors: Vec<(&str, Money)> = Vec::new();
        let mut debtors: Vec<(&str, Money)> = Vec::new();
        for person in balances {
            if person.balance > tolerance {
                creditors.push((person.name.as_str(), person.balance));
            } else if person.balance < -tolerance {
                debtors.push((person.name.as_str(), -person.balance));
            }
        }

        tracing::debug!(
            participant_count = balances.len(),
            creditor_count = creditors.len(),
            debtor_count = debtors.len(),
            tolerance = %tolerance,
            "Settlement matching started"
        );

        let mut transfers = Vec::with_capacity(creditors.len() + debtors.len());
        while let (Some(creditor_idx), Some(debtor_idx)) =
            (largest(&creditors), largest(&debtors))
        {
            let (creditor, credit) = creditors[creditor_idx];
            let (debtor, debt) = debtors[debtor_idx];
            let amount = credit.min(debt);

            if amount > tolerance {
                let rounded = amount.round_to(self.policy.scale, self.policy.rounding_mode);
                tracing::trace!(
                    sender = debtor,
                    receiver = creditor,
                    amount = %rounded,
                    "Transfer matched"
                );
                transfers.push(Transfer {
                    sender: debtor.to_string(),
                    receiver: creditor.to_string(),
                    amount: rounded,
                });
            }

            creditors[creditor_idx].1 -= amount;
            debtors[debtor_idx].1 -= amount;

            if creditors[creditor_idx].1 < tolerance {
                creditors.remove(creditor_idx);
            }
            if debtors[debtor_idx].1 < tolerance {
                debtors.remove(debtor_idx);
            }
        }

        if !creditors.is_empty() || !debtors.is_empty() {
            let unsettled: Money = creditors.iter().map(|(_, m)| *m).sum::<Money>()
                - debtors.iter().map(|(_, m)| *m).sum::<Money>();
            tracing::debug!(
                remaining_creditors = creditors.len(),
                remaining_debtors = debtors.len(),
                unsettled = %unsettled,
                "Settlement left an unmatched residual"
            );
        }

        transfers
    }

    /// Validates both tables and settles them.
    pub fn settle_tables(
        &self,
        should_pay: &Table,
        actually_paid: &Table,
    ) -> Result<Vec<Transfer>, SettlementError> {
        let should_pay = should_pay_from_table(should_pay)?;
        let actually_paid = actually_paid_from_table(actually_paid)?;
        Ok(self.settle(&should_pay, &actually_paid))
    }
}

/// Reads a `name, should_pay` table.
pub fn should_pay_from_table(source: &Table) -> Result<Vec<ShouldPayEntry>, SettlementError> {
    let indexes = source.require_columns(&[table::NAME, table::SHOULD_PAY])?;
    Ok(read_entries(source, &indexes, table::SHOULD_PAY)?
        .into_iter()
        .map(|(name, amount)| ShouldPayEntry::new(name, amount))
        .collect())
}

/// Reads a `name, actually_paid` table.
pub fn actually_paid_from_table(
    source: &Table,
) -> Result<Vec<ActuallyPaidEntry>, SettlementError> {
    let indexes = source.require_columns(&[table::NAME, table::ACTUALLY_PAID])?;
    Ok(read_entries(source, &indexes, table::ACTUALLY_PAID)?
        .into_iter()
        .map(|(name, amount)| ActuallyPaidEntry::new(name, amount))
        .collect())
}

fn largest(parties: &[(&str, Money)]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, (_, amount)) in parties.iter().enumerate() {
        match best {
            Some(current) if parties[current].1 >= *amount => {}
            _ => best = Some(idx),
        }
    }
    best
}

fn read_entries(
    source: &Table,
    indexes: &[usize],
    amount_column: &'static str,
) -> Result<Vec<(String, Money)>, SettlementError> {
    let (name_idx, amount_idx) = (indexes[0], indexes[1]);
    source
        .rows()
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let name = row[name_idx].to_string();
            let amount = match &row[amount_idx] {
                Value::Number(amount) if amount.exceeds_max_amount() => {
                    return Err(SettlementError::AmountOutOfRange {
                        table: source.name().to_string(),
                        column: amount_column,
                        row: row_idx + 1,
                        found: *amount,
                        max: Money::MAX_AMOUNT,
                    });
                }
                Value::Number(amount) => *amount,
                // Missing values count as zero, the same as an absent participant.
                Value::Text(text) if text.trim().is_empty() => Money::ZERO,
                Value::Text(text) => {
                    return Err(SettlementError::InvalidValue {
                        table: source.name().to_string(),
                        column: amount_column,
                        row: row_idx + 1,
                        found: text.clone(),
                    });
                }
            };
            Ok((name, amount))
        })
        .collect()
}

/// Builds the `sender, receiver, amount` output table.
pub fn transfers_to_table(transfers: &[Transfer]) -> Table {
    let mut out = Table::with_columns(
        "transfers",
        &[table::SENDER, table::RECEIVER, table::AMOUNT],
    );
    for transfer in transfers {
        out.push_row(vec![
            Value::Text(transfer.sender.clone()),
            Value::Text(transfer.receiver.clone()),
            Value::Number(transfer.amount),
        ]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[fixture]
    fn engine() -> SettlementEngine {
        SettlementEngine::new()
    }

    fn should(entries: &[(&str, Decimal)]) -> Vec<ShouldPayEntry> {
        entries
            .iter()
            .map(|(name, amount)| ShouldPayEntry::new(*name, Money::from_decimal(*amount)))
            .collect()
    }

    fn paid(entries: &[(&str, Decimal)]) -> Vec<ActuallyPaidEntry> {
        entries
            .iter()
            .map(|(name, amount)| ActuallyPaidEntry::new(*name, Money::from_decimal(*amount)))
            .collect()
    }

    fn transfer(sender: &str, receiver: &str, amount: Decimal) -> Transfer {
        Transfer {
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            amount: Money::from_decimal(amount),
        }
    }

    #[rstest]
    #[case::balanced(
        &[("Leo", dec!(30)), ("Ana", dec!(30)), ("Mia", dec!(30))],
        &[("Leo", dec!(30)), ("Ana", dec!(30)), ("Mia", dec!(30))],
        vec![]
    )]
    #[case::two_party(
        &[("Leo", dec!(50)), ("Ana", dec!(50))],
        &[("Leo", dec!(100)), ("Ana", dec!(0))],
        vec![transfer("Ana", "Leo", dec!(50.00))]
    )]
    #[case::fan_in(
        &[("Leo", dec!(30)), ("Ana", dec!(30)), ("Mia", dec!(30))],
        &[("Leo", dec!(50)), ("Ana", dec!(40)), ("Mia", dec!(0))],
        vec![transfer("Mia", "Leo", dec!(20.00)), transfer("Mia", "Ana", dec!(10.00))]
    )]
    #[case::fan_out(
        &[("Leo", dec!(10)), ("Ana", dec!(20)), ("Mia", dec!(30))],
        &[("Mia", dec!(60))],
        vec![transfer("Ana", "Mia", dec!(20.00)), transfer("Leo", "Mia", dec!(10.00))]
    )]
    #[case::payer_without_consumption(
        &[("Ana", dec!(25))],
        &[("Leo", dec!(25))],
        vec![transfer("Ana", "Leo", dec!(25.00))]
    )]
    #[case::sub_cent_noise_ignored(
        &[("Leo", dec!(30.004)), ("Ana", dec!(29.996))],
        &[("Leo", dec!(30)), ("Ana", dec!(30))],
        vec![]
    )]
    #[case::balance_equal_to_tolerance_excluded(
        &[("Leo", dec!(30.00)), ("Ana", dec!(30.01))],
        &[("Leo", dec!(30.01)), ("Ana", dec!(30.00))],
        vec![]
    )]
    #[case::balance_just_over_tolerance_settled(
        &[("Leo", dec!(30.00)), ("Ana", dec!(30.011))],
        &[("Leo", dec!(30.011)), ("Ana", dec!(30.00))],
        vec![transfer("Ana", "Leo", dec!(0.01))]
    )]
    #[case::rounds_repeating_shares(
        &[("Leo", dec!(33.333333)), ("Ana", dec!(33.333333)), ("Mia", dec!(33.333334))],
        &[("Leo", dec!(100))],
        vec![transfer("Mia", "Leo", dec!(33.33)), transfer("Ana", "Leo", dec!(33.33))]
    )]
    fn settles_examples(
        engine: SettlementEngine,
        #[case] should_pay: &[(&str, Decimal)],
        #[case] actually_paid: &[(&str, Decimal)],
        #[case] expected: Vec<Transfer>,
    ) {
        let transfers = engine.settle(&should(should_pay), &paid(actually_paid));
        assert_eq!(transfers, expected);
    }

    #[rstest]
    fn empty_inputs_yield_no_transfers(engine: SettlementEngine) {
        assert!(engine.settle(&[], &[]).is_empty());
    }

    #[rstest]
    fn unbalanced_total_leaves_residual(engine: SettlementEngine) {
        // Leo is owed 60 but the debtors only owe 40 between them.
        let transfers = engine.settle(
            &should(&[("Ana", dec!(25)), ("Mia", dec!(15))]),
            &paid(&[("Leo", dec!(60))]),
        );

        assert_eq!(
            transfers,
            vec![
                transfer("Ana", "Leo", dec!(25.00)),
                transfer("Mia", "Leo", dec!(15.00)),
            ]
        );
    }

    #[rstest]
    fn ties_resolve_by_name_order(engine: SettlementEngine) {
        let transfers = engine.settle(
            &should(&[("Zoe", dec!(10)), ("Ben", dec!(10))]),
            &paid(&[("Mia", dec!(10)), ("Ada", dec!(10))]),
        );

        assert_eq!(
            transfers,
            vec![
                transfer("Ben", "Ada", dec!(10.00)),
                transfer("Zoe", "Mia", dec!(10.00)),
            ]
        );
    }

    #[rstest]
    fn repeated_names_accumulate(engine: SettlementEngine) {
        let balances = engine.net_balances(
            &should(&[("Leo", dec!(5)), ("Leo", dec!(7))]),
            &paid(&[("Leo", dec!(2))]),
        );

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].balance, Money::from_decimal(dec!(-10)));
    }

    #[rstest]
    #[case::half_up(RoundingMode::HalfUp, dec!(10.13))]
    #[case::half_even(RoundingMode::HalfEven, dec!(10.12))]
    fn rounding_mode_controls_quantization(#[case] mode: RoundingMode, #[case] expected: Decimal) {
        let engine = SettlementEngine::with_policy(SettlementPolicy {
            rounding_mode: mode,
            ..SettlementPolicy::default()
        });

        let transfers = engine.settle(
            &should(&[("Ana", dec!(10.125))]),
            &paid(&[("Leo", dec!(10.125))]),
        );

        assert_eq!(transfers, vec![transfer("Ana", "Leo", expected)]);
    }

    #[rstest]
    fn settle_tables_matches_typed_settlement(engine: SettlementEngine) {
        let should_pay = Table::with_columns("should_pay_df", &[table::NAME, table::SHOULD_PAY])
            .with_row(vec![Value::infer("Leo"), Value::infer("50")])
            .with_row(vec![Value::infer("Ana"), Value::infer("50")]);
        let actually_paid =
            Table::with_columns("actually_paid_df", &[table::NAME, table::ACTUALLY_PAID])
                .with_row(vec![Value::infer("Leo"), Value::infer("100")])
                .with_row(vec![Value::infer("Ana"), Value::infer("0")]);

        let transfers = engine
            .settle_tables(&should_pay, &actually_paid)
            .expect("valid tables");

        assert_eq!(transfers, vec![transfer("Ana", "Leo", dec!(50))]);
    }

    #[rstest]
    #[case::should_pay_missing(
        Table::with_columns("should_pay_df", &[table::NAME, "wrong_column"]),
        Table::with_columns("actually_paid_df", &[table::NAME, table::ACTUALLY_PAID]),
        "should_pay_df",
        table::SHOULD_PAY
    )]
    #[case::actually_paid_missing(
        Table::with_columns("should_pay_df", &[table::NAME, table::SHOULD_PAY]),
        Table::with_columns("actually_paid_df", &[table::NAME, "wrong_column"]),
        "actually_paid_df",
        table::ACTUALLY_PAID
    )]
    #[case::name_missing(
        Table::with_columns("should_pay_df", &[table::SHOULD_PAY]),
        Table::with_columns("actually_paid_df", &[table::NAME, table::ACTUALLY_PAID]),
        "should_pay_df",
        table::NAME
    )]
    fn settle_tables_rejects_missing_columns(
        engine: SettlementEngine,
        #[case] should_pay: Table,
        #[case] actually_paid: Table,
        #[case] expected_table: &str,
        #[case] expected_column: &str,
    ) {
        let err = engine
            .settle_tables(&should_pay, &actually_paid)
            .expect_err("schema must be rejected");

        match &err {
            SettlementError::Schema(schema) => {
                assert_eq!(schema.table, expected_table);
                assert_eq!(schema.missing, vec![expected_column.to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains(expected_column));
    }

    #[rstest]
    fn settle_tables_rejects_non_numeric_amounts(engine: SettlementEngine) {
        let should_pay = Table::with_columns("should_pay_df", &[table::NAME, table::SHOULD_PAY])
            .with_row(vec![Value::infer("Leo"), Value::infer("thirty")]);
        let actually_paid =
            Table::with_columns("actually_paid_df", &[table::NAME, table::ACTUALLY_PAID]);

        let err = engine
            .settle_tables(&should_pay, &actually_paid)
            .expect_err("non-numeric amount");

        assert_eq!(
            err,
            SettlementError::InvalidValue {
                table: "should_pay_df".to_string(),
                column: table::SHOULD_PAY,
                row: 1,
                found: "thirty".to_string(),
            }
        );
    }

    #[rstest]
    #[case::should_pay(table::SHOULD_PAY)]
    #[case::actually_paid(table::ACTUALLY_PAID)]
    fn settle_tables_rejects_amounts_beyond_max(
        engine: SettlementEngine,
        #[case] oversized_column: &'static str,
    ) {
        let cell = |column: &str| {
            if column == oversized_column {
                "50000000000000000000000000000"
            } else {
                "10"
            }
        };
        let should_pay = Table::with_columns("should_pay_df", &[table::NAME, table::SHOULD_PAY])
            .with_row(vec![Value::infer("Leo"), Value::infer(cell(table::SHOULD_PAY))])
            .with_row(vec![Value::infer("Leo"), Value::infer(cell(table::SHOULD_PAY))]);
        let actually_paid =
            Table::with_columns("actually_paid_df", &[table::NAME, table::ACTUALLY_PAID])
                .with_row(vec![Value::infer("Leo"), Value::infer(cell(table::ACTUALLY_PAID))])
                .with_row(vec![Value::infer("Leo"), Value::infer(cell(table::ACTUALLY_PAID))]);

        let err = engine
            .settle_tables(&should_pay, &actually_paid)
            .expect_err("amount beyond the supported range");

        match err {
            SettlementError::AmountOutOfRange { column, row, max, .. } => {
                assert_eq!(column, oversized_column);
                assert_eq!(row, 1);
                assert_eq!(max, Money::MAX_AMOUNT);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    fn settle_tables_accepts_max_amount(engine: SettlementEngine) {
        let should_pay = Table::with_columns("should_pay_df", &[table::NAME, table::SHOULD_PAY])
            .with_row(vec![Value::infer("Ana"), Value::infer("1000000000000000")]);
        let actually_paid =
            Table::with_columns("actually_paid_df", &[table::NAME, table::ACTUALLY_PAID])
                .with_row(vec![Value::infer("Leo"), Value::infer("1000000000000000")]);

        let transfers = engine
            .settle_tables(&should_pay, &actually_paid)
            .expect("amount at the limit");

        assert_eq!(transfers, vec![transfer("Ana", "Leo", dec!(1000000000000000.00))]);
    }

    #[test]
    fn transfers_table_has_output_columns() {
        let out = transfers_to_table(&[transfer("Ana", "Leo", dec!(50.00))]);

        assert_eq!(out.columns(), ["sender", "receiver", "amount"]);
        assert_eq!(out.rows()[0][2], Value::Number(Money::from_decimal(dec!(50.00))));
    }
}
