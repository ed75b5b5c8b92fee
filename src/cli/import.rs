use std::io::Read;

use colored::Colorize;
use comfy_table::{Cell, Table};
use tracing::info;

use crate::db;
use crate::error::{AppError, Result};
use crate::fmt::{money, qty};
use crate::importer;
use crate::ledger::append_records;
use crate::models::{Diagnostic, ParseResult};
use crate::settings::{db_path, load_settings};

pub struct ImportOptions {
    pub dry_run: bool,
    pub json: bool,
    pub strict: bool,
    pub force: bool,
}

fn read_input(file: Option<&str>) -> Result<(String, String)> {
    match file {
        None | Some("-") => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(("stdin".to_string(), text))
        }
        Some(path) => Ok((path.to_string(), std::fs::read_to_string(path)?)),
    }
}

fn preview_table(result: &ParseResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Item", "Category", "Store", "Date", "Unit Price", "Qty", "Price",
    ]);
    for r in &result.records {
        table.add_row(vec![
            Cell::new(&r.item),
            Cell::new(&r.category),
            Cell::new(&r.store),
            Cell::new(&r.date),
            Cell::new(format!("{}{}", money(r.unit_price), r.pricing_unit.price_suffix())),
            Cell::new(qty(r.qty)),
            Cell::new(money(r.price)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(money(result.total()).bold()),
    ]);
    table
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    println!("{}", format!("{} issue(s) found:", diagnostics.len()).yellow());
    for d in diagnostics {
        println!("  {} {d}", "•".yellow());
    }
}

pub fn run(file: Option<String>, opts: ImportOptions) -> Result<()> {
    let settings = load_settings();
    let (source, text) = read_input(file.as_deref())?;
    let result = importer::parse(&text);

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if !result.records.is_empty() {
        println!("{}", preview_table(&result));
    }
    if !opts.json {
        print_diagnostics(&result.diagnostics);
    }

    if opts.dry_run {
        return Ok(());
    }
    if result.records.is_empty() {
        if !opts.json {
            println!("Nothing to import.");
        }
        return Ok(());
    }
    if (opts.strict || settings.strict_import) && !result.diagnostics.is_empty() {
        return Err(AppError::FlaggedImport(result.diagnostics.len()));
    }

    let conn = db::open(&db_path())?;
    let outcome = append_records(
        &conn,
        &source,
        &text,
        &result.records,
        result.diagnostics.len(),
        opts.force,
    )?;
    info!(
        source = %source,
        import_id = ?outcome.import_id,
        imported = outcome.imported,
        "import finished"
    );

    if opts.json {
        return Ok(());
    }
    if outcome.duplicate_paste {
        println!("This paste has already been imported (use --force to store it again).");
    } else {
        println!(
            "{} imported, total {}",
            outcome.imported,
            money(result.total())
        );
    }
    Ok(())
}
