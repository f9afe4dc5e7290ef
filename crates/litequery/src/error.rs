//! Error types for litequery

use thiserror::Error;

/// Result type alias for litequery operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Error types for database operations.
///
/// Failures of compiled queries are recorded on the [`Statement`](crate::Statement)
/// that ran them; this type is returned by the surrounding API (opening a
/// database, raw `execute`, transactions, typed row decoding).
#[derive(Debug, Error)]
pub enum SqlError {
    /// Error reported by the SQLite engine
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SqlError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if the engine rejected the statement because of a constraint
    /// (UNIQUE, NOT NULL, FOREIGN KEY, CHECK, ...).
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }

    /// Check if this is a decode error
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
