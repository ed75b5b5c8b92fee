use std::io::Write;

use crate::cli::ExportFormat;
use crate::db;
use crate::error::Result;
use crate::ledger::list_expenses;
use crate::models::StoredExpense;
use crate::settings::db_path;

const CSV_HEADER: [&str; 10] = [
    "id",
    "date",
    "item",
    "category",
    "store",
    "unit_price",
    "qty",
    "price",
    "pricing_unit",
    "import_id",
];

pub fn write_csv<W: Write>(out: W, expenses: &[StoredExpense]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(CSV_HEADER)?;
    for e in expenses {
        let r = &e.record;
        wtr.write_record([
            e.id.to_string(),
            r.date.clone(),
            r.item.clone(),
            r.category.clone(),
            r.store.clone(),
            format!("{:.2}", r.unit_price),
            r.qty.to_string(),
            format!("{:.2}", r.price),
            r.pricing_unit.as_str().to_string(),
            e.import_id.map(|id| id.to_string()).unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(mut out: W, expenses: &[StoredExpense]) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, expenses)?;
    writeln!(out)?;
    Ok(())
}

pub fn run(format: ExportFormat, output: Option<String>) -> Result<()> {
    let conn = db::open(&db_path())?;
    let expenses = list_expenses(&conn)?;

    let out: Box<dyn Write> = match &output {
        Some(path) => {
            let path = std::path::Path::new(path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Box::new(std::fs::File::create(path)?)
        }
        None => Box::new(std::io::stdout().lock()),
    };
    match format {
        ExportFormat::Csv => write_csv(out, &expenses)?,
        ExportFormat::Json => write_json(out, &expenses)?,
    }

    if let Some(path) = output {
        eprintln!("Wrote {} expense(s) to {path}", expenses.len());
    }
    Ok(())
}
