//! Error types for the SQLite secret store.

/// Errors that can occur when working with the secret store.
#[derive(Debug, thiserror::Error)]
pub enum SqliteStoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection string is not a sqlite URL
    #[error("requested database type was not recognized: {0}")]
    UnknownDbType(String),

    /// Database path in the URL is not valid UTF-8 once decoded
    #[error("invalid database path: {0}")]
    InvalidPath(String),
}

/// Result type alias for store setup operations.
pub type Result<T> = std::result::Result<T, SqliteStoreError>;
