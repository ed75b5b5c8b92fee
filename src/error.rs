use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Invalid expense: {0}")]
    InvalidEntry(String),

    #[error("Unknown expense id: {0}")]
    UnknownExpense(i64),

    #[error("Import refused: {0} diagnostic(s) need attention (strict import is on)")]
    FlaggedImport(usize),
}

pub type Result<T> = std::result::Result<T, AppError>;
