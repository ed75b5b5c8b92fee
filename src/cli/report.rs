use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::db;
use crate::error::Result;
use crate::fmt::{money, percent, qty};
use crate::ledger::list_expenses;
use crate::models::ExpenseRecord;
use crate::reports::{self, Trend};
use crate::settings::db_path;

fn load_records() -> Result<Vec<ExpenseRecord>> {
    let conn = db::open(&db_path())?;
    Ok(list_expenses(&conn)?.into_iter().map(|e| e.record).collect())
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

pub fn summary() -> Result<()> {
    let records = load_records()?;
    let s = reports::summary(&records);

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Items"), right(s.total_items.to_string())]);
    table.add_row(vec![
        Cell::new("Total spent".bold()),
        right(money(s.total_amount)),
    ]);
    table.add_row(vec![Cell::new("Average per item"), right(money(s.average_per_item))]);
    table.add_row(vec![
        Cell::new("Top category"),
        Cell::new(s.top_category.as_deref().unwrap_or("-")),
    ]);
    println!("Summary\n{table}");
    Ok(())
}

pub fn categories() -> Result<()> {
    let records = load_records()?;
    let rows = reports::by_category(&records);

    let mut table = Table::new();
    table.set_header(vec!["Category", "Items", "Qty", "Avg Unit Price", "Total"]);
    let mut grand = 0.0;
    for c in &rows {
        grand += c.total;
        table.add_row(vec![
            Cell::new(&c.name),
            right(c.count.to_string()),
            right(qty(c.qty_total)),
            right(money(c.avg_unit_price)),
            right(money(c.total)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        right(money(grand)),
    ]);
    println!("Spending by Category\n{table}");
    Ok(())
}

pub fn monthly() -> Result<()> {
    let records = load_records()?;
    let report = reports::by_month(&records, Local::now().date_naive());

    let mut table = Table::new();
    table.set_header(vec!["Month", "Items", "Total", "Change"]);
    for m in &report.months {
        let change = percent(m.change_pct);
        let change = if m.change_pct > 0.0 {
            change.red()
        } else if m.change_pct < 0.0 {
            change.green()
        } else {
            change.normal()
        };
        table.add_row(vec![
            Cell::new(&m.label),
            right(m.count.to_string()),
            right(money(m.total)),
            Cell::new(change).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("Monthly Spending\n{table}");

    let trend = match report.trend {
        Trend::Increasing => report.trend.to_string().red(),
        Trend::Decreasing => report.trend.to_string().green(),
        Trend::Stable => report.trend.to_string().normal(),
    };
    println!("Average per month: {}", money(report.average));
    println!("Trend: {trend}");
    Ok(())
}

pub fn stores() -> Result<()> {
    let records = load_records()?;
    let rows = reports::by_store(&records);

    let mut table = Table::new();
    table.set_header(vec!["Store", "Purchases", "Distinct Items", "Total"]);
    for s in &rows {
        table.add_row(vec![
            Cell::new(&s.name),
            right(s.count.to_string()),
            right(s.distinct_items.to_string()),
            right(money(s.total)),
        ]);
    }
    println!("Spending by Store\n{table}");
    Ok(())
}
