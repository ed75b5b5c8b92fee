use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::importer::round_to;
use crate::models::{ExpenseRecord, PricingUnit};

/// A hand-entered (or hand-edited) expense before validation.
#[derive(Debug, Clone, Default)]
pub struct ExpenseDraft {
    pub item: String,
    pub category: Option<String>,
    pub store: String,
    pub date: String,
    pub unit_price: f64,
    pub qty: f64,
    /// When `None` the price is `unit_price * qty`.
    pub price: Option<f64>,
    pub pricing_unit: PricingUnit,
}

impl ExpenseDraft {
    pub fn from_record(record: &ExpenseRecord) -> Self {
        Self {
            item: record.item.clone(),
            category: Some(record.category.clone()),
            store: record.store.clone(),
            date: record.date.clone(),
            unit_price: record.unit_price,
            qty: record.qty,
            price: Some(record.price),
            pricing_unit: record.pricing_unit,
        }
    }

    /// A row priced at zero despite a positive unit price and quantity was
    /// refused pricing at import (unit mismatch) and must not be repriced.
    pub fn is_unpriced(&self) -> bool {
        self.price == Some(0.0) && self.unit_price > 0.0 && self.qty > 0.0
    }

    pub fn validate(self, default_category: &str) -> Result<ExpenseRecord> {
        let item = self.item.trim().to_string();
        if item.is_empty() {
            return Err(AppError::InvalidEntry("item is required".into()));
        }
        let date = self.date.trim().to_string();
        if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
            return Err(AppError::InvalidEntry(format!(
                "date must be YYYY-MM-DD, got '{date}'"
            )));
        }
        for (name, value) in [("unit price", self.unit_price), ("qty", self.qty)] {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::InvalidEntry(format!("{name} must be zero or more")));
            }
        }
        if let Some(p) = self.price {
            if !p.is_finite() || p < 0.0 {
                return Err(AppError::InvalidEntry("price must be zero or more".into()));
            }
        }

        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| default_category.to_string());
        let unit_price = round_to(self.unit_price, 2);
        let qty = round_to(self.qty, 3);
        let price = round_to(self.price.unwrap_or(unit_price * qty), 2);

        Ok(ExpenseRecord {
            item,
            category,
            store: self.store.trim().to_string(),
            date,
            unit_price,
            qty,
            price,
            pricing_unit: self.pricing_unit,
        })
    }
}
