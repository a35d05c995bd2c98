pub const NAME: &str = "Name";
pub const SHOULD_PAY: &str = "Should pay";
pub const ACTUALLY_PAID: &str = "Actually paid";
pub const BALANCE: &str = "Balance";
pub const FROM: &str = "From";
pub const TO: &str = "To";
pub const AMOUNT: &str = "Amount";
pub const TRANSFERS: &str = "Transfers";
pub const BALANCES: &str = "Balances";
pub const ALL_SETTLED: &str = "Everyone is settled up; no transfers needed.";
pub const NO_TRANSFERS: &str = "No transfers can settle the remaining balance.";

pub fn unsettled_residual(residual: impl std::fmt::Display) -> String {
    format!("Warning: the ledger does not balance; {residual} is left unsettled.")
}
