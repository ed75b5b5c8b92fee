use crate::db;
use crate::error::Result;
use crate::ledger::delete_expenses;
use crate::settings::db_path;

pub fn run(ids: &[i64]) -> Result<()> {
    let conn = db::open(&db_path())?;
    let deleted = delete_expenses(&conn, ids)?;
    println!("Deleted {deleted} of {} expense(s).", ids.len());
    Ok(())
}
