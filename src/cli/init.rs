use std::path::PathBuf;

use crate::db;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path, DB_FILE};

pub fn run(data_dir: Option<String>, strict: bool) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if strict {
        settings.strict_import = true;
    }
    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    db::open(&resolved.join(DB_FILE))?;

    println!("Initialized receiptbook at {}", resolved.display());
    if settings.strict_import {
        println!("Strict import is on: pastes with diagnostics will be refused.");
    }
    Ok(())
}
