//! Error types for store operations.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Native DB error.
    #[error("Database error: {0}")]
    Database(String),

    /// Record not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Seed file could not be parsed.
    #[error("Seed parse error: {0}")]
    Seed(#[from] ron::error::SpannedError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<native_db::db_type::Error> for Error {
    fn from(err: native_db::db_type::Error) -> Self {
        Error::Database(err.to_string())
    }
}

impl Error {
    /// Convert into the core error reported for a failed load
    pub fn into_load_error(self) -> garden_core::Error {
        garden_core::Error::StoreLoad(self.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;
