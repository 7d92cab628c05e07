//! Per-table read interface consumed by the fingerprint engine.

use async_trait::async_trait;
use thiserror::Error;

use crate::descriptor::TableDescriptor;
use crate::table_name::TableName;
use crate::value::SampleValue;

/// Failure of a single sampler query
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleError {
    /// The connection was lost or could not be used (S001)
    #[error("[S001] Connection unavailable: {0}")]
    Connection(String),

    /// The query ran but failed (S002)
    #[error("[S002] Query failed: {0}")]
    Query(String),

    /// The query returned something that could not be read (S003)
    #[error("[S003] Unreadable result: {0}")]
    Decode(String),
}

/// Result type alias for SampleError
pub type SampleResult<T> = Result<T, SampleError>;

/// Thin database access used to fingerprint one table.
///
/// Each call is one read query. Implementations must be Send + Sync so
/// tables can be fingerprinted from a bounded worker pool.
#[async_trait]
pub trait RowSampler: Send + Sync {
    /// Exact row count of `table`
    async fn count(&self, table: &TableName) -> SampleResult<u64>;

    /// Maximum value of `key_column` rendered as a string, `None` if the
    /// table has no non-null key values
    async fn max_key(&self, table: &TableName, key_column: &str) -> SampleResult<Option<String>>;

    /// One row of `table` with column values in table column order.
    ///
    /// The descriptor's column list, when present, decides which columns
    /// are read and how. With a `key` of `(column, value)` the row whose key
    /// equals `value` is returned; without one, an arbitrary row. `None`
    /// when no row matches.
    async fn sample_row(
        &self,
        table: &TableDescriptor,
        key: Option<(&str, &str)>,
    ) -> SampleResult<Option<Vec<SampleValue>>>;
}
