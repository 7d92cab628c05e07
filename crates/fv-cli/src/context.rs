//! Runtime context for CLI commands

use anyhow::{bail, Context, Result};
use fv_core::Config;
use fv_db::DuckDbBackend;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use crate::cli::GlobalArgs;
use crate::prompt::prompt_value;

/// Runtime context containing the resolved configuration and the database
/// connection shared by every stage of a command
pub(crate) struct RuntimeContext {
    /// Configuration after file, flags and prompts were applied
    pub config: Config,

    /// Database connection, opened once per command
    pub db: Arc<DuckDbBackend>,
}

impl RuntimeContext {
    /// Resolve configuration and connect to the database.
    ///
    /// A missing database path is prompted for when stdin is a terminal.
    pub async fn new(args: &GlobalArgs) -> Result<Self> {
        let mut config = resolve_config(args)?;

        if config.database.database_path().is_none() {
            config.database.path = Some(prompt_database_path()?);
        }
        config.validate().context("Invalid configuration")?;

        let db = DuckDbBackend::connect(&config.database)
            .await
            .context("Failed to connect to database")?;

        Ok(Self {
            config,
            db: Arc::new(db),
        })
    }
}

/// Load the config file (if any) and layer command-line flags on top
pub(crate) fn resolve_config(args: &GlobalArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(Path::new(path))
            .with_context(|| format!("Failed to load configuration file {}", path))?,
        None => Config::default(),
    };
    apply_overrides(&mut config, args);
    Ok(config)
}

/// Apply flags to `config`. Empty string flags are treated as unset.
pub(crate) fn apply_overrides(config: &mut Config, args: &GlobalArgs) {
    let given = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

    if let Some(input) = given(&args.input) {
        config.input = Some(input);
    }
    if let Some(output) = given(&args.output) {
        config.output = Some(output);
    }
    if let Some(schema) = given(&args.schema) {
        config.schema = Some(schema);
    }
    if let Some(path) = given(&args.database) {
        config.database.path = Some(path);
    }
    if let Some(db_schema) = given(&args.db_schema) {
        config.database.schema = db_schema;
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if let Some(policy) = args.new_tables {
        config.new_tables = policy.into();
    }
}

fn prompt_database_path() -> Result<String> {
    if !std::io::stdin().is_terminal() {
        bail!("No database given: pass --database or set database.path in the config file");
    }
    let mut input = std::io::stdin().lock();
    let mut output = std::io::stderr();
    prompt_value(&mut input, &mut output, "database path")
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
