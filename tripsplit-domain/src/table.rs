//! Column-oriented record sets exchanged with the settlement engine.
//!
//! Tables are the structural contract between the aggregators, the engine and
//! whatever reads or writes them (CSV files in practice). A table only knows
//! its column names and cell values; whether the columns a consumer needs are
//! present is checked with [`Table::require_columns`].

use crate::model::Money;
use std::fmt;
use thiserror::Error;

pub const NAME: &str = "name";
pub const SHOULD_PAY: &str = "should_pay";
pub const ACTUALLY_PAID: &str = "actually_paid";
pub const SENDER: &str = "sender";
pub const RECEIVER: &str = "receiver";
pub const AMOUNT: &str = "amount";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Number(Money),
}

impl Value {
    /// Interprets raw cell text, preferring a number when the text parses as one.
    pub fn infer(raw: &str) -> Self {
        match raw.parse::<Money>() {
            Ok(number) => Value::Number(number),
            Err(_) => Value::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::Number(number) => write!(f, "{number}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{table} must have columns {}", quote_columns(.missing))]
pub struct SchemaError {
    pub table: String,
    pub missing: Vec<String>,
}

fn quote_columns(columns: &[String]) -> String {
    columns
        .iter()
        .map(|column| format!("'{column}'"))
        .collect::<Vec<_>>()
        .join(" and ")
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_columns(name: impl Into<String>, columns: &[&str]) -> Self {
        Self::new(name, columns.iter().map(|c| (*c).to_string()).collect())
    }

    /// Appends a row; short rows are padded with empty text, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Text(String::new()));
        self.rows.push(row);
    }

    pub fn with_row(mut self, row: Vec<Value>) -> Self {
        self.push_row(row);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Fails with every required column that is absent, in the order requested.
    pub fn require_columns(&self, required: &[&str]) -> Result<Vec<usize>, SchemaError> {
        let mut indexes = Vec::with_capacity(required.len());
        let mut missing = Vec::new();
        for column in required {
            match self.column_index(column) {
                Some(idx) => indexes.push(idx),
                None => missing.push((*column).to_string()),
            }
        }

        if missing.is_empty() {
            Ok(indexes)
        } else {
            Err(SchemaError {
                table: self.name.clone(),
                missing,
            })
        }
    }
}
