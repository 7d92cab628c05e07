//! `fv config-export`: write the resolved configuration to disk

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::{ExportArgs, GlobalArgs};
use crate::context::resolve_config;

/// Execute the config-export command
pub(crate) async fn execute(args: &ExportArgs, global: &GlobalArgs) -> Result<()> {
    let config = resolve_config(global)?;
    config.validate().context("Invalid configuration")?;

    let path = config
        .export_to_dir(Path::new(&args.dir))
        .context("Failed to export configuration")?;
    println!("Configuration written to {}", path.display());
    Ok(())
}
