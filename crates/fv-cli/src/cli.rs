//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use fv_core::TableSetPolicy;

/// fv - detect whether database tables changed between two runs
#[derive(Parser, Debug)]
#[command(name = "fv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute (defaults to `verify`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global arguments available to all commands.
///
/// Every option left unset falls back to the config file, then to the
/// built-in default.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Config file (JSON, or YAML with a .yml/.yaml extension)
    #[arg(short, long, global = true, env = "FV_CONFIG")]
    pub config: Option<String>,

    /// Prior run report to compare against
    #[arg(long = "in", global = true)]
    pub input: Option<String>,

    /// Where to write this run's report
    #[arg(long = "out", global = true)]
    pub output: Option<String>,

    /// Table list file to use instead of the live catalog
    #[arg(short, long, global = true)]
    pub schema: Option<String>,

    /// DuckDB database file
    #[arg(short, long, global = true, env = "FV_DATABASE")]
    pub database: Option<String>,

    /// Database schema whose tables are verified
    #[arg(long, global = true)]
    pub db_schema: Option<String>,

    /// Number of tables fingerprinted concurrently
    #[arg(short = 'j', long, global = true)]
    pub threads: Option<usize>,

    /// Treatment of tables added or removed since the prior run
    #[arg(long, global = true, value_enum)]
    pub new_tables: Option<NewTablesArg>,

    /// Exit with status 1 when the verdict is NOT_MATCH
    #[arg(long, global = true)]
    pub fail_on_mismatch: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Fingerprint every table and compare against the prior run
    Verify,

    /// Write the resolved configuration to DIR/config.json
    #[command(visible_alias = "ce")]
    ConfigExport(ExportArgs),

    /// Write the live table list to DIR/schema.csv
    #[command(visible_alias = "se")]
    SchemaExport(ExportArgs),
}

/// Arguments for the export commands
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ExportArgs {
    /// Output directory
    #[arg(default_value = ".")]
    pub dir: String,
}

/// Log output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// `--new-tables` values
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewTablesArg {
    /// Skip added and removed tables
    Ignore,
    /// List added and removed tables without changing the verdict
    Report,
    /// Added or removed tables make the verdict NOT_MATCH
    Strict,
}

impl From<NewTablesArg> for TableSetPolicy {
    fn from(arg: NewTablesArg) -> Self {
        match arg {
            NewTablesArg::Ignore => TableSetPolicy::Ignore,
            NewTablesArg::Report => TableSetPolicy::Report,
            NewTablesArg::Strict => TableSetPolicy::Strict,
        }
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
