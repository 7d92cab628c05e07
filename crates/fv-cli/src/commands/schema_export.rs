//! `fv schema-export`: write the live table list as a table list file

use anyhow::{Context, Result};
use fv_core::table_list::write_table_list;
use fv_db::DatabaseCatalog;
use std::path::{Path, PathBuf};

use crate::cli::{ExportArgs, GlobalArgs};
use crate::context::RuntimeContext;

/// File name written inside the export directory
const SCHEMA_FILE: &str = "schema.csv";

/// Execute the schema-export command
pub(crate) async fn execute(args: &ExportArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global).await?;
    let path = export(&ctx, Path::new(&args.dir)).await?;
    println!("Table list written to {}", path.display());
    Ok(())
}

async fn export(ctx: &RuntimeContext, dir: &Path) -> Result<PathBuf> {
    let schema = &ctx.config.database.schema;
    let tables = ctx
        .db
        .list_tables(schema, &ctx.config.identity_column)
        .await
        .with_context(|| format!("Failed to list tables in schema {}", schema))?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    let path = dir.join(SCHEMA_FILE);
    write_table_list(&path, &tables).context("Failed to write table list")?;
    tracing::info!("exported {} tables from schema {}", tables.len(), schema);
    Ok(path)
}
