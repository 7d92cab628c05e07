//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use fv_core::table_list::load_table_list;
use fv_core::TableDescriptor;
use fv_db::DatabaseCatalog;
use std::fmt;
use std::path::Path;

use crate::context::RuntimeContext;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main exits with the code without printing.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Tables to verify: the configured table list file, or else the live
/// catalog of the configured schema. Unqualified names in a table list
/// belong to the configured schema.
pub(crate) async fn load_descriptors(ctx: &RuntimeContext) -> Result<Vec<TableDescriptor>> {
    match &ctx.config.schema {
        Some(path) => {
            tracing::info!("reading table list {}", path);
            load_table_list(Path::new(path), &ctx.config.database.schema)
                .with_context(|| format!("Failed to read table list {}", path))
        }
        None => {
            let schema = &ctx.config.database.schema;
            tracing::info!("reading catalog of schema {}", schema);
            ctx.db
                .list_tables(schema, &ctx.config.identity_column)
                .await
                .with_context(|| format!("Failed to list tables in schema {}", schema))
        }
    }
}
