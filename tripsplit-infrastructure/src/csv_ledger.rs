use rust_decimal::Decimal;
use serde::Deserialize;
use std::{
    collections::HashSet,
    fs::File,
    io::{self, Read},
    ops::RangeInclusive,
    path::PathBuf,
};
use thiserror::Error;
use tripsplit_application::{LedgerSource, LedgerSourceError};
use tripsplit_domain::{ItemRecord, Money};

pub const REQUIRED_COLUMNS: [&str; 6] = [
    "payer",
    "item_name",
    "item_price",
    "shared_by",
    "tax_pct",
    "tip_pct",
];

const SHARER_SEPARATOR: char = ';';

/// Accepted ranges for the tax and tip rates of an item, and its largest total.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationLimits {
    pub tax_pct: RangeInclusive<Decimal>,
    pub tip_pct: RangeInclusive<Decimal>,
    /// Upper bound for the price including tax and tip.
    pub max_item_total: Money,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            tax_pct: Decimal::new(5, 2)..=Decimal::new(15, 2),
            tip_pct: Decimal::ZERO..=Decimal::new(50, 2),
            max_item_total: Money::MAX_AMOUNT,
        }
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to open '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("ledger must have columns {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("row {row}: '{column}' is not numeric (found '{value}')")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("row {row}: item_price must not be negative (found {value})")]
    NegativePrice { row: usize, value: Money },
    #[error("row {row}: {column} {value} is outside [{min}, {max}]")]
    RateOutOfRange {
        row: usize,
        column: &'static str,
        value: Decimal,
        min: Decimal,
        max: Decimal,
    },
    #[error("row {row}: item total with tax and tip exceeds {max}")]
    ItemTotalTooLarge { row: usize, max: Money },
    #[error("row {row}: payer is empty")]
    MissingPayer { row: usize },
    #[error("row {row}: invalid shared_by: {detail}")]
    InvalidSharers { row: usize, detail: String },
}

impl LedgerError {
    /// Data row (1-based, header excluded) the error refers to, if any.
    pub fn row(&self) -> Option<usize> {
        match self {
            LedgerError::InvalidNumber { row, .. }
            | LedgerError::NegativePrice { row, .. }
            | LedgerError::RateOutOfRange { row, .. }
            | LedgerError::ItemTotalTooLarge { row, .. }
            | LedgerError::MissingPayer { row }
            | LedgerError::InvalidSharers { row, .. } => Some(*row),
            LedgerError::Io { .. } | LedgerError::Csv(_) | LedgerError::MissingColumns(_) => {
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ItemRow {
    payer: String,
    item_name: String,
    item_price: String,
    shared_by: String,
    tax_pct: String,
    tip_pct: String,
}

/// Item ledger stored as a CSV file.
#[derive(Clone, Debug)]
pub struct CsvLedgerSource {
    path: PathBuf,
    limits: ValidationLimits,
}

impl CsvLedgerSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            limits: ValidationLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn load(&self) -> Result<Vec<ItemRecord>, LedgerError> {
        let file = File::open(&self.path).map_err(|source| LedgerError::Io {
            path: self.path.clone(),
            source,
        })?;
        let items = parse_reader(file, &self.limits)?;
        tracing::debug!(
            path = %self.path.display(),
            item_count = items.len(),
            "Ledger loaded"
        );
        Ok(items)
    }
}

impl LedgerSource for CsvLedgerSource {
    fn load_items(&self) -> Result<Vec<ItemRecord>, LedgerSourceError> {
        self.load()
            .map_err(|err| map_ledger_error(err, &self.path.display().to_string()))
    }
}

pub fn parse_str(text: &str, limits: &ValidationLimits) -> Result<Vec<ItemRecord>, LedgerError> {
    parse_reader(text.as_bytes(), limits)
}

pub fn parse_reader<R: Read>(
    reader: R,
    limits: &ValidationLimits,
) -> Result<Vec<ItemRecord>, LedgerError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .map(|column| (*column).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LedgerError::MissingColumns(missing));
    }

    reader
        .deserialize::<ItemRow>()
        .enumerate()
        .map(|(idx, row)| validate_row(idx + 1, row?, limits))
        .collect()
}

fn validate_row(
    row: usize,
    raw: ItemRow,
    limits: &ValidationLimits,
) -> Result<ItemRecord, LedgerError> {
    let payer = raw.payer.trim();
    if payer.is_empty() {
        return Err(LedgerError::MissingPayer { row });
    }

    let item_price = parse_number(row, "item_price", &raw.item_price)?;
    if item_price.is_negative() {
        return Err(LedgerError::NegativePrice {
            row,
            value: item_price,
        });
    }

    let tax_pct = parse_rate(row, "tax_pct", &raw.tax_pct, &limits.tax_pct)?;
    let tip_pct = parse_rate(row, "tip_pct", &raw.tip_pct, &limits.tip_pct)?;
    let shared_by = parse_sharers(row, &raw.shared_by)?;

    let record = ItemRecord {
        payer: payer.to_string(),
        item_name: raw.item_name.trim().to_string(),
        item_price,
        shared_by,
        tax_pct,
        tip_pct,
    };
    match record.checked_total_cost() {
        Some(total) if total <= limits.max_item_total => Ok(record),
        _ => Err(LedgerError::ItemTotalTooLarge {
            row,
            max: limits.max_item_total,
        }),
    }
}

fn parse_number(row: usize, column: &'static str, value: &str) -> Result<Money, LedgerError> {
    value.parse::<Money>().map_err(|_| LedgerError::InvalidNumber {
        row,
        column,
        value: value.to_string(),
    })
}

fn parse_rate(
    row: usize,
    column: &'static str,
    value: &str,
    range: &RangeInclusive<Decimal>,
) -> Result<Decimal, LedgerError> {
    let rate = parse_number(row, column, value)?.as_decimal();
    if !range.contains(&rate) {
        return Err(LedgerError::RateOutOfRange {
            row,
            column,
            value: rate,
            min: *range.start(),
            max: *range.end(),
        });
    }
    Ok(rate)
}

fn parse_sharers(row: usize, value: &str) -> Result<Vec<String>, LedgerError> {
    if value.trim().is_empty() {
        return Err(LedgerError::InvalidSharers {
            row,
            detail: "no sharers listed".to_string(),
        });
    }

    let mut seen = HashSet::new();
    let mut sharers = Vec::new();
    for name in value.split(SHARER_SEPARATOR).map(str::trim) {
        if name.is_empty() {
            return Err(LedgerError::InvalidSharers {
                row,
                detail: format!("empty name in '{value}'"),
            });
        }
        if !seen.insert(name) {
            return Err(LedgerError::InvalidSharers {
                row,
                detail: format!("'{name}' is listed more than once"),
            });
        }
        sharers.push(name.to_string());
    }
    Ok(sharers)
}

pub fn map_ledger_error(err: LedgerError, location: &str) -> LedgerSourceError {
    let location = location.to_string();
    match err {
        LedgerError::Io { source, .. } => LedgerSourceError::Unreadable {
            location,
            detail: source.to_string(),
        },
        LedgerError::Csv(source) => LedgerSourceError::Unreadable {
            location,
            detail: source.to_string(),
        },
        LedgerError::MissingColumns(columns) => {
            LedgerSourceError::MissingColumns { location, columns }
        }
        other => LedgerSourceError::InvalidRecord {
            location,
            row: other.row().unwrap_or_default(),
            detail: other.to_string(),
        },
    }
}
