//! Database trait definitions

use crate::error::DbResult;
use async_trait::async_trait;
use fv_core::{RowSampler, TableDescriptor};

/// Connection-level operations
#[async_trait]
pub trait DatabaseCore: Send + Sync {
    /// Execute multiple SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a trivial query to prove the connection is usable
    async fn ping(&self) -> DbResult<()>;
}

/// Catalog introspection (the live table descriptor supplier)
#[async_trait]
pub trait DatabaseCatalog: Send + Sync {
    /// Describe every base table in `schema`, smallest estimated row count
    /// first.
    ///
    /// A table's identity key is its single-column primary key, or else a
    /// column named `identity_column`.
    async fn list_tables(
        &self,
        schema: &str,
        identity_column: &str,
    ) -> DbResult<Vec<TableDescriptor>>;
}

/// Everything a run needs from a database
pub trait Database: DatabaseCore + DatabaseCatalog + RowSampler {}

impl<T: DatabaseCore + DatabaseCatalog + RowSampler> Database for T {}
