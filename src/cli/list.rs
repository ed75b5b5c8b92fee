use comfy_table::{Cell, CellAlignment, Table};

use crate::db;
use crate::error::Result;
use crate::fmt::{money, qty};
use crate::ledger::list_expenses;
use crate::reports::{search, SortKey};
use crate::settings::db_path;

pub fn run(query: Option<String>, sort: SortKey, descending: bool) -> Result<()> {
    let conn = db::open(&db_path())?;
    let expenses = list_expenses(&conn)?;
    let rows = search(&expenses, query.as_deref(), sort, descending);

    if rows.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Date", "Item", "Category", "Store", "Unit Price", "Qty", "Price",
    ]);
    let mut total = 0.0;
    for e in &rows {
        let r = &e.record;
        total += r.price;
        table.add_row(vec![
            Cell::new(e.id),
            Cell::new(&r.date),
            Cell::new(&r.item),
            Cell::new(&r.category),
            Cell::new(&r.store),
            Cell::new(format!("{}{}", money(r.unit_price), r.pricing_unit.price_suffix()))
                .set_alignment(CellAlignment::Right),
            Cell::new(qty(r.qty)).set_alignment(CellAlignment::Right),
            Cell::new(money(r.price)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("Expenses\n{table}");
    println!("{} item(s), {}", rows.len(), money(total));
    Ok(())
}
