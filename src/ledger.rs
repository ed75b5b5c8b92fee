use rusqlite::{Connection, OptionalExtension, Row};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::{ExpenseRecord, StoredExpense};

const EXPENSE_COLUMNS: &str =
    "id, import_id, item, category, store, date, unit_price, qty, price, pricing_unit";

pub fn text_checksum(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

fn row_to_expense(row: &Row<'_>) -> rusqlite::Result<StoredExpense> {
    let unit: String = row.get(9)?;
    Ok(StoredExpense {
        id: row.get(0)?,
        import_id: row.get(1)?,
        record: ExpenseRecord {
            item: row.get(2)?,
            category: row.get(3)?,
            store: row.get(4)?,
            date: row.get(5)?,
            unit_price: row.get(6)?,
            qty: row.get(7)?,
            price: row.get(8)?,
            pricing_unit: unit.parse().unwrap_or_default(),
        },
    })
}

// ---------------------------------------------------------------------------
// Bulk append
// ---------------------------------------------------------------------------

pub struct ImportResult {
    pub imported: usize,
    pub import_id: Option<i64>,
    pub duplicate_paste: bool,
}

/// Append a parsed batch in order, recording it as one import.
///
/// The same pasted text is only stored once unless `force` is set.
pub fn append_records(
    conn: &Connection,
    source: &str,
    text: &str,
    records: &[ExpenseRecord],
    diagnostic_count: usize,
    force: bool,
) -> Result<ImportResult> {
    let checksum = text_checksum(text);
    if !force {
        let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
        if stmt.exists([&checksum])? {
            info!(%checksum, "paste already imported");
            return Ok(ImportResult {
                imported: 0,
                import_id: None,
                duplicate_paste: true,
            });
        }
    }

    let dates: Vec<&str> = records
        .iter()
        .map(|r| r.date.as_str())
        .filter(|d| !d.is_empty())
        .collect();
    let min_date = dates.iter().min().copied();
    let max_date = dates.iter().max().copied();

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO imports (source, checksum, record_count, diagnostic_count, date_range_start, date_range_end) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            source,
            checksum,
            records.len() as i64,
            diagnostic_count as i64,
            min_date,
            max_date,
        ],
    )?;
    let import_id = tx.last_insert_rowid();
    for record in records {
        insert_expense(&tx, record, Some(import_id))?;
    }
    tx.commit()?;

    debug!(import_id, count = records.len(), "appended import batch");
    Ok(ImportResult {
        imported: records.len(),
        import_id: Some(import_id),
        duplicate_paste: false,
    })
}

// ---------------------------------------------------------------------------
// Single expenses
// ---------------------------------------------------------------------------

pub fn insert_expense(conn: &Connection, record: &ExpenseRecord, import_id: Option<i64>) -> Result<i64> {
    conn.execute(
        "INSERT INTO expenses (item, category, store, date, unit_price, qty, price, pricing_unit, import_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            record.item,
            record.category,
            record.store,
            record.date,
            record.unit_price,
            record.qty,
            record.price,
            record.pricing_unit.as_str(),
            import_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_expenses(conn: &Connection) -> Result<Vec<StoredExpense>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses ORDER BY date, id"
    ))?;
    let rows = stmt
        .query_map([], row_to_expense)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_expense(conn: &Connection, id: i64) -> Result<StoredExpense> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?1"
    ))?;
    stmt.query_row([id], row_to_expense)
        .optional()?
        .ok_or(AppError::UnknownExpense(id))
}

pub fn update_expense(conn: &Connection, id: i64, record: &ExpenseRecord) -> Result<()> {
    let changed = conn.execute(
        "UPDATE expenses SET item = ?1, category = ?2, store = ?3, date = ?4, \
         unit_price = ?5, qty = ?6, price = ?7, pricing_unit = ?8 WHERE id = ?9",
        rusqlite::params![
            record.item,
            record.category,
            record.store,
            record.date,
            record.unit_price,
            record.qty,
            record.price,
            record.pricing_unit.as_str(),
            id,
        ],
    )?;
    if changed == 0 {
        return Err(AppError::UnknownExpense(id));
    }
    Ok(())
}

/// Delete the given ids; unknown ids are ignored. Returns how many rows went away.
pub fn delete_expenses(conn: &Connection, ids: &[i64]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut deleted = 0usize;
    {
        let mut stmt = tx.prepare("DELETE FROM expenses WHERE id = ?1")?;
        for id in ids {
            deleted += stmt.execute([id])?;
        }
    }
    tx.commit()?;
    Ok(deleted)
}
