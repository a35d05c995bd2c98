use rust_decimal::{Decimal, RoundingStrategy};
use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// One cent, the smallest amount a transfer may carry.
    pub const CENT: Self = Self(Decimal::from_parts(1, 0, 0, false, 2));

    /// Largest magnitude accepted from external input (10^15).
    ///
    /// Sums of many such amounts stay far inside the `Decimal` range, so
    /// arithmetic on validated money cannot overflow.
    pub const MAX_AMOUNT: Self = Self(Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0));

    /// Builds `num * 10^-scale`, e.g. `Money::new(1250, 2)` is `12.50`.
    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn exceeds_max_amount(self) -> bool {
        self.0.abs() > Self::MAX_AMOUNT.0
    }

    pub fn signum(self) -> i64 {
        if self.0.is_zero() {
            0
        } else if self.0.is_sign_negative() {
            -1
        } else {
            1
        }
    }

    /// Rounds to `scale` decimal places and pads to exactly that many.
    pub fn round_to(self, scale: u32, mode: RoundingMode) -> Self {
        let mut rounded = self.0.round_dp_with_strategy(scale, mode.strategy());
        rounded.rescale(scale);
        Self(rounded)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Self)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Money {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Rounding mode for quantizing transfer amounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round half away from zero (0.005 -> 0.01).
    #[default]
    HalfUp,
    /// Round half to the nearest even digit (banker's rounding).
    HalfEven,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShouldPayEntry {
    pub name: String,
    pub should_pay: Money,
}

impl ShouldPayEntry {
    pub fn new(name: impl Into<String>, should_pay: Money) -> Self {
        Self {
            name: name.into(),
            should_pay,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActuallyPaidEntry {
    pub name: String,
    pub actually_paid: Money,
}

impl ActuallyPaidEntry {
    pub fn new(name: impl Into<String>, actually_paid: Money) -> Self {
        Self {
            name: name.into(),
            actually_paid,
        }
    }
}

/// Net position of one participant (positive: overpaid, negative: owes money).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonBalance {
    pub name: String,
    pub should_pay: Money,
    pub actually_paid: Money,
    pub balance: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Transfer {
    pub sender: String,
    pub receiver: String,
    pub amount: Money,
}

/// One purchased item of the trip ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemRecord {
    pub payer: String,
    pub item_name: String,
    pub item_price: Money,
    pub shared_by: Vec<String>,
    pub tax_pct: Decimal,
    pub tip_pct: Decimal,
}

impl ItemRecord {
    /// Price including tax and tip.
    pub fn total_cost(&self) -> Money {
        self.item_price * (Decimal::ONE + self.tax_pct + self.tip_pct)
    }

    /// [`Self::total_cost`], or `None` when the rates or price overflow.
    pub fn checked_total_cost(&self) -> Option<Money> {
        let multiplier = Decimal::ONE
            .checked_add(self.tax_pct)?
            .checked_add(self.tip_pct)?;
        self.item_price.0.checked_mul(multiplier).map(Money::from_decimal)
    }

    /// Portion of [`Self::total_cost`] owed by each sharer.
    ///
    /// Returns zero for an item nobody shares; validated ledgers never contain one.
    pub fn share_per_person(&self) -> Money {
        if self.shared_by.is_empty() {
            return Money::ZERO;
        }
        self.total_cost() / Decimal::from(self.shared_by.len())
    }

    pub fn is_shared_by(&self, name: &str) -> bool {
        self.shared_by.iter().any(|sharer| sharer == name)
    }
}
