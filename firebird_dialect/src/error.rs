//! Error types for the Firebird dialect layer

use thiserror::Error;

/// Result type for dialect operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the Firebird dialect layer
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported granularity: {0}")]
    UnsupportedGranularity(String),

    #[error("Unknown identifier: {0:?}")]
    UnknownIdentifier(String),

    #[error("Schema conflict: {0}")]
    SchemaConflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Integrity error: {0}")]
    IntegrityError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Syntax error: {0}")]
    SyntaxError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Whether the error belongs to the database error family.
    ///
    /// Schema conflicts are reported here too: the caller sees the same kind
    /// of failure it would get from running the DDL against a stale schema.
    pub fn is_database_error(&self) -> bool {
        matches!(
            self,
            Error::SchemaConflict(_) | Error::DatabaseError(_) | Error::IntegrityError(_)
        )
    }
}

/// Convert Serde JSON errors to dialect errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert TOML deserialization errors to dialect errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
