pub mod add;
pub mod delete;
pub mod edit;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod report;
pub mod status;

use clap::{Parser, Subcommand, ValueEnum};

use crate::reports::SortKey;

#[derive(Parser)]
#[command(
    name = "receiptbook",
    about = "Household expense log that imports pasted Markdown receipt tables."
)]
pub struct Cli {
    /// Show debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up receiptbook: choose a data directory and initialize the database.
    Init {
        /// Path for receiptbook data (default: ~/Documents/receiptbook)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Refuse to import pastes that produce diagnostics
        #[arg(long)]
        strict: bool,
    },
    /// Parse a pasted Markdown table and store its rows.
    Import {
        /// File containing the table; reads stdin when omitted or '-'
        file: Option<String>,
        /// Preview only, store nothing
        #[arg(long = "dry-run")]
        dry_run: bool,
        /// Print the parse result as JSON
        #[arg(long)]
        json: bool,
        /// Refuse to store anything if a diagnostic was reported
        #[arg(long)]
        strict: bool,
        /// Store the paste even if the same text was imported before
        #[arg(long)]
        force: bool,
    },
    /// Add a single expense by hand.
    Add {
        /// What was bought, e.g. 'Kosher Salt 16 oz'
        item: String,
        /// Purchase date: YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Price per piece (or per pound with --by-weight)
        #[arg(long = "unit-price")]
        unit_price: f64,
        #[arg(long, default_value = "1")]
        qty: f64,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "")]
        store: String,
        /// Total paid, when it differs from unit price x qty
        #[arg(long)]
        price: Option<f64>,
        /// Unit price is per pound
        #[arg(long = "by-weight")]
        by_weight: bool,
    },
    /// Change fields of a stored expense. Price follows unit price and qty unless given.
    Edit {
        id: i64,
        #[arg(long)]
        item: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long = "unit-price")]
        unit_price: Option<f64>,
        #[arg(long)]
        qty: Option<f64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        store: Option<String>,
        #[arg(long)]
        price: Option<f64>,
    },
    /// Delete one or more expenses by id.
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// List stored expenses.
    List {
        /// Only items containing this text
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value = "date")]
        sort: SortKey,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Spending reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Export stored expenses.
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show current database and summary statistics.
    Status,
    /// Print a shell completion script.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Totals, average per item, top category.
    Summary,
    /// Spend per category.
    Categories,
    /// Spend per month for the last twelve months.
    Monthly,
    /// Spend per store.
    Stores,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}
