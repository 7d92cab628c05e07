//! Error types for fv-db

use fv_core::SampleError;
use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// Catalog introspection error (D004)
    #[error("[D004] Catalog query failed for schema '{schema}': {message}")]
    CatalogError { schema: String, message: String },

    /// Column value with no text form (D005)
    #[error("[D005] Cannot decode column value: {0}")]
    DecodeError(String),

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants, so missing
        // relations are recognized by message.
        let msg = err.to_string();
        if msg.contains("Table with name")
            || msg.contains("View with name")
            || msg.contains("Table or view with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}

impl From<DbError> for SampleError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionError(_) | DbError::MutexPoisoned(_) => {
                SampleError::Connection(err.to_string())
            }
            DbError::DecodeError(_) => SampleError::Decode(err.to_string()),
            other => SampleError::Query(other.to_string()),
        }
    }
}
