use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PassengerError>;

#[derive(Error, Debug)]
pub enum PassengerError {
    #[error("data source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("invalid passenger id: {0:?}")]
    InvalidId(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// Histogram requested over no rows, or over fares that sum to zero.
    #[error("cannot compute fare shares: {0}")]
    EmptyTable(&'static str),

    #[error("invalid data config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PassengerError {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        PassengerError::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn chart(err: impl ToString) -> Self {
        PassengerError::Chart(err.to_string())
    }
}
