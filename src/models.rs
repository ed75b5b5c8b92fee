use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a unit price is quoted: per piece or per pound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PricingUnit {
    #[default]
    #[serde(rename = "each")]
    Each,
    #[serde(rename = "lb")]
    ByWeight,
}

impl PricingUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Each => "each",
            Self::ByWeight => "lb",
        }
    }

    /// Suffix used when showing a unit price, e.g. `$3.49 / lb`.
    pub fn price_suffix(&self) -> &'static str {
        match self {
            Self::Each => " each",
            Self::ByWeight => " / lb",
        }
    }
}

impl fmt::Display for PricingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "each" => Ok(Self::Each),
            "lb" => Ok(Self::ByWeight),
            other => Err(format!("unknown pricing unit: {other}")),
        }
    }
}

/// One purchased line item, as produced by the Markdown importer or manual entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub item: String,
    pub category: String,
    pub store: String,
    pub date: String,
    pub unit_price: f64,
    pub qty: f64,
    pub price: f64,
    pub pricing_unit: PricingUnit,
}

/// An expense as persisted in the database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredExpense {
    pub id: i64,
    pub import_id: Option<i64>,
    #[serde(flatten)]
    pub record: ExpenseRecord,
}

/// A problem found while parsing a pasted table.
///
/// Global diagnostics concern the whole paste (no table, missing columns).
/// Row diagnostics point at one body line; the row itself is still emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    Global { message: String },
    Row { line: usize, reasons: Vec<String> },
}

impl Diagnostic {
    pub fn global(message: impl Into<String>) -> Self {
        Self::Global {
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global { message } => f.write_str(message),
            Self::Row { line, reasons } => write!(f, "Row {line}: {}", reasons.join("; ")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseResult {
    pub records: Vec<ExpenseRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    pub fn total(&self) -> f64 {
        self.records.iter().map(|r| r.price).sum()
    }
}
