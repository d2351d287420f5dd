use crate::document::DocumentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Snapshot error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("{0}")]
    Other(String),
}
