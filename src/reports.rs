use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::models::{ExpenseRecord, StoredExpense};

const MONTHS_SHOWN: i32 = 12;

fn label_or_other(s: &str) -> &str {
    if s.trim().is_empty() {
        "Other"
    } else {
        s
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

pub struct Summary {
    pub total_items: usize,
    pub total_amount: f64,
    pub average_per_item: f64,
    pub top_category: Option<String>,
}

pub fn summary(records: &[ExpenseRecord]) -> Summary {
    let total_amount: f64 = records.iter().map(|r| r.price).sum();
    let total_items = records.len();
    Summary {
        total_items,
        total_amount,
        average_per_item: if total_items > 0 {
            total_amount / total_items as f64
        } else {
            0.0
        },
        top_category: by_category(records).into_iter().next().map(|c| c.name),
    }
}

// ---------------------------------------------------------------------------
// By category
// ---------------------------------------------------------------------------

pub struct CategoryTotal {
    pub name: String,
    pub total: f64,
    pub count: usize,
    pub avg_unit_price: f64,
    pub qty_total: f64,
}

/// Totals per category, largest spend first.
pub fn by_category(records: &[ExpenseRecord]) -> Vec<CategoryTotal> {
    let mut groups: BTreeMap<&str, (f64, usize, f64, f64)> = BTreeMap::new();
    for r in records {
        let entry = groups.entry(label_or_other(&r.category)).or_default();
        entry.0 += r.price;
        entry.1 += 1;
        entry.2 += r.unit_price;
        entry.3 += r.qty;
    }
    let mut out: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|(name, (total, count, unit_sum, qty_total))| CategoryTotal {
            name: name.to_string(),
            total,
            count,
            avg_unit_price: unit_sum / count as f64,
            qty_total,
        })
        .collect();
    out.sort_by(|a, b| b.total.total_cmp(&a.total));
    out
}

// ---------------------------------------------------------------------------
// Monthly
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        })
    }
}

pub struct MonthTotal {
    /// `YYYY-MM`
    pub month: String,
    pub label: String,
    pub total: f64,
    pub count: usize,
    /// Percent change from the previous month; 0 when that month had no spend.
    pub change_pct: f64,
}

pub struct MonthlyReport {
    pub months: Vec<MonthTotal>,
    pub trend: Trend,
    pub average: f64,
}

fn month_start(today: NaiveDate, months_back: i32) -> Option<NaiveDate> {
    let index = today.year() * 12 + today.month0() as i32 - months_back;
    NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)
}

/// Spend for the twelve months ending with `today`'s month, oldest first.
/// Expenses dated outside that window are ignored.
pub fn by_month(records: &[ExpenseRecord], today: NaiveDate) -> MonthlyReport {
    let mut months: Vec<MonthTotal> = (0..MONTHS_SHOWN)
        .rev()
        .filter_map(|back| month_start(today, back))
        .map(|d| MonthTotal {
            month: d.format("%Y-%m").to_string(),
            label: d.format("%b %Y").to_string(),
            total: 0.0,
            count: 0,
            change_pct: 0.0,
        })
        .collect();

    for r in records {
        let key = r.date.get(..7).unwrap_or("");
        if let Some(m) = months.iter_mut().find(|m| m.month == key) {
            m.total += r.price;
            m.count += 1;
        }
    }

    for i in 1..months.len() {
        let prev = months[i - 1].total;
        months[i].change_pct = if prev != 0.0 {
            (months[i].total - prev) / prev * 100.0
        } else {
            0.0
        };
    }

    let recent = &months[months.len().saturating_sub(3)..];
    let increases = recent.iter().filter(|m| m.change_pct > 0.0).count();
    let decreases = recent.iter().filter(|m| m.change_pct < 0.0).count();
    let trend = if increases >= 2 {
        Trend::Increasing
    } else if decreases >= 2 {
        Trend::Decreasing
    } else {
        Trend::Stable
    };

    let average = months.iter().map(|m| m.total).sum::<f64>() / months.len().max(1) as f64;
    MonthlyReport {
        months,
        trend,
        average,
    }
}

// ---------------------------------------------------------------------------
// By store
// ---------------------------------------------------------------------------

pub struct StoreTotal {
    pub name: String,
    pub total: f64,
    pub count: usize,
    pub distinct_items: usize,
}

pub fn by_store(records: &[ExpenseRecord]) -> Vec<StoreTotal> {
    let mut groups: BTreeMap<&str, (f64, usize, BTreeSet<&str>)> = BTreeMap::new();
    for r in records {
        let entry = groups.entry(label_or_other(&r.store)).or_default();
        entry.0 += r.price;
        entry.1 += 1;
        entry.2.insert(r.item.as_str());
    }
    let mut out: Vec<StoreTotal> = groups
        .into_iter()
        .map(|(name, (total, count, items))| StoreTotal {
            name: name.to_string(),
            total,
            count,
            distinct_items: items.len(),
        })
        .collect();
    out.sort_by(|a, b| b.total.total_cmp(&a.total));
    out
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    UnitPrice,
    Price,
    Date,
}

/// Case-insensitive item filter, sorted by the chosen field.
pub fn search<'a>(
    expenses: &'a [StoredExpense],
    query: Option<&str>,
    sort: SortKey,
    descending: bool,
) -> Vec<&'a StoredExpense> {
    let needle = query.map(|q| q.trim().to_lowercase()).unwrap_or_default();
    let mut rows: Vec<&StoredExpense> = expenses
        .iter()
        .filter(|e| needle.is_empty() || e.record.item.to_lowercase().contains(&needle))
        .collect();
    rows.sort_by(|a, b| {
        let ord = match sort {
            SortKey::UnitPrice => a.record.unit_price.total_cmp(&b.record.unit_price),
            SortKey::Price => a.record.price.total_cmp(&b.record.price),
            SortKey::Date => a.record.date.cmp(&b.record.date),
        };
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
    rows
}
