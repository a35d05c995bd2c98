use crate::{
    labels,
    text_table::{Alignment, TextTableBuilder},
};
use std::borrow::Cow;
use tripsplit_application::SettlementReport;
use tripsplit_domain::{Money, PersonBalance, RoundingMode, Transfer};

const DISPLAY_SCALE: u32 = 2;

pub struct SettlementPresenter;

pub struct SettlementView {
    pub balance_table: String,
    /// `None` when nobody owes anybody.
    pub transfer_table: Option<String>,
    pub settled: bool,
    pub residual_warning: Option<String>,
}

impl SettlementView {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(labels::BALANCES);
        out.push('\n');
        out.push_str(&self.balance_table);
        out.push('\n');
        match &self.transfer_table {
            Some(table) => {
                out.push_str(labels::TRANSFERS);
                out.push('\n');
                out.push_str(table);
            }
            None if self.settled => {
                out.push_str(labels::ALL_SETTLED);
                out.push('\n');
            }
            None => {
                out.push_str(labels::NO_TRANSFERS);
                out.push('\n');
            }
        }
        if let Some(warning) = &self.residual_warning {
            out.push('\n');
            out.push_str(warning);
            out.push('\n');
        }
        out
    }
}

impl SettlementPresenter {
    pub fn render(report: &SettlementReport, tolerance: Money) -> SettlementView {
        let balance_table = Self::build_balance_table(&report.balances);
        let transfer_table = if report.transfers.is_empty() {
            None
        } else {
            Some(Self::build_transfer_table(&report.transfers))
        };
        let residual_warning = (report.residual.abs() > tolerance)
            .then(|| labels::unsettled_residual(format_amount(report.residual)));

        SettlementView {
            balance_table,
            transfer_table,
            settled: report.is_settled(tolerance),
            residual_warning,
        }
    }

    pub fn build_balance_table(balances: &[PersonBalance]) -> String {
        let headers = [
            Cow::Borrowed(labels::NAME),
            Cow::Borrowed(labels::SHOULD_PAY),
            Cow::Borrowed(labels::ACTUALLY_PAID),
            Cow::Borrowed(labels::BALANCE),
        ];
        let alignments = [
            Alignment::Left,
            Alignment::Right,
            Alignment::Right,
            Alignment::Right,
        ];

        TextTableBuilder::new()
            .alignments(&alignments)
            .headers(&headers)
            .rows(balances.iter().map(|person| {
                [
                    Cow::Borrowed(person.name.as_str()),
                    Cow::Owned(format_amount(person.should_pay)),
                    Cow::Owned(format_amount(person.actually_paid)),
                    Cow::Owned(format_signed(person.balance)),
                ]
            }))
            .build()
    }

    pub fn build_transfer_table(transfers: &[Transfer]) -> String {
        let headers = [
            Cow::Borrowed(labels::FROM),
            Cow::Borrowed(labels::TO),
            Cow::Borrowed(labels::AMOUNT),
        ];
        let alignments = [Alignment::Left, Alignment::Left, Alignment::Right];

        TextTableBuilder::new()
            .alignments(&alignments)
            .headers(&headers)
            .rows(transfers.iter().map(|transfer| {
                [
                    Cow::Borrowed(transfer.sender.as_str()),
                    Cow::Borrowed(transfer.receiver.as_str()),
                    Cow::Owned(format_amount(transfer.amount)),
                ]
            }))
            .build()
    }
}

fn format_amount(amount: Money) -> String {
    amount.round_to(DISPLAY_SCALE, RoundingMode::HalfUp).to_string()
}

fn format_signed(amount: Money) -> String {
    let sign = if amount.signum() > 0 { "+" } else { "" };
    format!("{sign}{}", format_amount(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tripsplit_domain::{ActuallyPaidEntry, ShouldPayEntry};

    fn balance(name: &str, should_pay: Money, actually_paid: Money) -> PersonBalance {
        PersonBalance {
            name: name.to_string(),
            should_pay,
            actually_paid,
            balance: actually_paid - should_pay,
        }
    }

    fn sample_report(transfers: Vec<Transfer>, residual: Money) -> SettlementReport {
        SettlementReport {
            should_pay: vec![ShouldPayEntry::new("Ana", Money::from_decimal(dec!(38.775)))],
            actually_paid: vec![ActuallyPaidEntry::new("Leo", Money::from_decimal(dec!(39.45)))],
            balances: vec![
                balance("Ana", Money::from_decimal(dec!(38.775)), Money::from_decimal(dec!(25.4))),
                balance("Leo", Money::from_decimal(dec!(26.075)), Money::from_decimal(dec!(39.45))),
            ],
            transfers,
            residual,
        }
    }

    #[test]
    fn renders_balances_and_transfers() {
        let report = sample_report(
            vec![Transfer {
                sender: "Ana".to_string(),
                receiver: "Leo".to_string(),
                amount: Money::from_decimal(dec!(13.38)),
            }],
            Money::ZERO,
        );

        let view = SettlementPresenter::render(&report, Money::CENT);

        assert!(view.balance_table.contains("38.78"));
        assert!(view.balance_table.contains("-13.38"));
        assert!(view.balance_table.contains("+13.38"));
        let transfers = view.transfer_table.as_ref().expect("transfer table");
        assert!(transfers.contains("Ana   Leo   13.38"));
        assert!(view.residual_warning.is_none());
    }

    #[test]
    fn settled_report_says_so() {
        let view = SettlementPresenter::render(&sample_report(vec![], Money::ZERO), Money::CENT);

        assert!(view.transfer_table.is_none());
        assert!(view.to_text().contains(labels::ALL_SETTLED));
    }

    #[test]
    fn unbalanced_report_warns() {
        let view =
            SettlementPresenter::render(&sample_report(vec![], Money::from_i64(15)), Money::CENT);

        let text = view.to_text();
        assert!(!view.settled);
        assert!(text.contains(labels::NO_TRANSFERS));
        assert!(!text.contains(labels::ALL_SETTLED));
        let warning = view.residual_warning.expect("residual warning");
        assert!(warning.contains("15.00"));
    }
}
