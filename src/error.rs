//! Error types for todolite.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TodoError>;

/// Errors that can occur in todolite.
#[derive(Error, Debug)]
pub enum TodoError {
    /// A bundled migration script could not be found.
    #[error("Script resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Schema introspection failed while deciding whether a migration runs.
    #[error("Schema probe failed: {0}")]
    SchemaProbe(String),

    /// A single SQL statement failed.
    #[error("Statement failed: {0}")]
    Statement(String),

    /// Caller supplied an argument outside the accepted range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The migration chain failed; storage is unusable for this process.
    #[error("Storage migration failed: {0}")]
    MigrationFailed(String),

    /// Connection-level database failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration or path resolution failure.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for TodoError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for TodoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<tokio::task::JoinError> for TodoError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Database(format!("Storage task aborted: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TodoError::InvalidArgument("page must be >= 1".to_string());
        assert_eq!(err.to_string(), "Invalid argument: page must be >= 1");

        let err = TodoError::ResourceUnavailable("migrate-v3".to_string());
        assert_eq!(err.to_string(), "Script resource unavailable: migrate-v3");
    }

    #[test]
    fn test_from_rusqlite() {
        let err: TodoError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, TodoError::Database(_)));
    }
}
