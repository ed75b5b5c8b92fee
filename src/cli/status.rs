use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{format_bytes, money};
use crate::settings::{load_settings, settings_path, DB_FILE};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join(DB_FILE);

    println!("Settings:   {}", settings_path().display());
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());
    println!("Strict:     {}", if settings.strict_import { "on" } else { "off" });

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let imports: i64 = conn.query_row("SELECT count(*) FROM imports", [], |r| r.get(0))?;
        let (expenses, spent): (i64, f64) = conn.query_row(
            "SELECT count(*), COALESCE(SUM(price), 0) FROM expenses",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        let range: (Option<String>, Option<String>) = conn.query_row(
            "SELECT MIN(date), MAX(date) FROM expenses WHERE date != ''",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;

        println!();
        println!("Imports:    {imports}");
        println!("Expenses:   {expenses}");
        println!("Spent:      {}", money(spent));
        if let (Some(first), Some(last)) = range {
            println!("Dates:      {first} to {last}");
        }
    } else {
        println!();
        println!("Database not found. Run `receiptbook init` to set up.");
    }

    Ok(())
}
