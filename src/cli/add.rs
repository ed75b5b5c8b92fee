use crate::db;
use crate::entry::ExpenseDraft;
use crate::error::Result;
use crate::fmt::money;
use crate::ledger::insert_expense;
use crate::settings::{db_path, load_settings};

pub fn run(draft: ExpenseDraft) -> Result<()> {
    let settings = load_settings();
    let record = draft.validate(&settings.default_category)?;
    let conn = db::open(&db_path())?;
    let id = insert_expense(&conn, &record, None)?;
    println!(
        "Added #{id}: {} ({}) {}",
        record.item,
        record.category,
        money(record.price)
    );
    Ok(())
}
