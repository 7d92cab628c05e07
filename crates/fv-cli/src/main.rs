//! fv - verify that database tables are unchanged between runs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod context;
mod prompt;

use cli::{Cli, Commands, GlobalArgs, LogFormat};
use commands::common::ExitCode;
use commands::{config_export, schema_export, verify};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(&cli.global) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    let command = cli.command.clone().unwrap_or(Commands::Verify);
    tracing::debug!("fv {} running {:?}", env!("CARGO_PKG_VERSION"), command);

    let result = match &command {
        Commands::Verify => verify::execute(&cli.global).await,
        Commands::ConfigExport(args) => config_export::execute(args, &cli.global).await,
        Commands::SchemaExport(args) => schema_export::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        if let Some(code) = err.downcast_ref::<ExitCode>() {
            std::process::exit(code.0);
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `--verbose`; records
/// from the `log` facade are forwarded to the subscriber.
fn setup_logging(args: &GlobalArgs) -> Result<()> {
    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match args.log_format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to install logger: {}", e))
}
