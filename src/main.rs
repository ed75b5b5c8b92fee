mod cli;
mod db;
mod entry;
mod error;
mod fmt;
mod importer;
mod ledger;
mod models;
mod reports;
mod settings;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ReportCommands};
use entry::ExpenseDraft;
use models::PricingUnit;

fn init_logging(verbose: bool) {
    let default = if verbose { "receiptbook=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init { data_dir, strict } => cli::init::run(data_dir, strict),
        Commands::Import {
            file,
            dry_run,
            json,
            strict,
            force,
        } => cli::import::run(
            file,
            cli::import::ImportOptions {
                dry_run,
                json,
                strict,
                force,
            },
        ),
        Commands::Add {
            item,
            date,
            unit_price,
            qty,
            category,
            store,
            price,
            by_weight,
        } => cli::add::run(ExpenseDraft {
            item,
            category,
            store,
            date,
            unit_price,
            qty,
            price,
            pricing_unit: if by_weight {
                PricingUnit::ByWeight
            } else {
                PricingUnit::Each
            },
        }),
        Commands::Edit {
            id,
            item,
            date,
            unit_price,
            qty,
            category,
            store,
            price,
        } => cli::edit::run(
            id,
            cli::edit::ExpenseChanges {
                item,
                date,
                unit_price,
                qty,
                category,
                store,
                price,
            },
        ),
        Commands::Delete { ids } => cli::delete::run(&ids),
        Commands::List { search, sort, desc } => cli::list::run(search, sort, desc),
        Commands::Report { command } => match command {
            ReportCommands::Summary => cli::report::summary(),
            ReportCommands::Categories => cli::report::categories(),
            ReportCommands::Monthly => cli::report::monthly(),
            ReportCommands::Stores => cli::report::stores(),
        },
        Commands::Export { format, output } => cli::export::run(format, output),
        Commands::Status => cli::status::run(),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "receiptbook", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
