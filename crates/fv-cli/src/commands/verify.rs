//! `fv verify`: fingerprint every table and compare against the prior run

use anyhow::{Context, Result};
use chrono::DateTime;
use fv_core::run::execute as run_tables;
use fv_core::{load_prior, RowSampler, RunContext, RunResult, Verdict};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;

use crate::cli::GlobalArgs;
use crate::commands::common::{load_descriptors, ExitCode};
use crate::context::RuntimeContext;

/// Execute the verify command
pub(crate) async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global).await?;
    let tables = load_descriptors(&ctx).await?;
    let prior = ctx
        .config
        .input
        .as_deref()
        .and_then(|path| load_prior(Path::new(path)));

    if tables.is_empty() {
        tracing::warn!("no tables to verify");
    }

    let progress = if global.verbose {
        None
    } else {
        let pb = ProgressBar::new(tables.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    };

    let run_ctx = RunContext::new(ctx.config.clone(), tables, prior);
    let sampler: Arc<dyn RowSampler> = ctx.db.clone();
    let result = run_tables(&run_ctx, sampler, |fp| {
        if let Some(pb) = &progress {
            pb.set_message(fp.name.clone());
            pb.inc(1);
        }
    })
    .await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if let Some(out) = &ctx.config.output {
        result
            .save(Path::new(out))
            .with_context(|| format!("Failed to write run report {}", out))?;
        println!("Result written to {}", out);
    }

    print_summary(&result);

    if global.fail_on_mismatch && result.status == Some(Verdict::NotMatch) {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn print_summary(result: &RunResult) {
    let started = DateTime::from_timestamp(result.start, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| result.start.to_string());
    println!(
        "Run {} started {}: {} tables in {} ms",
        result.run_id,
        started,
        result.tables.len(),
        result.duration_ms
    );

    for fp in result.degraded_tables() {
        println!("  ! {}: {}", fp.name, fp.warnings.join("; "));
    }

    let Some(comparison) = &result.comparison else {
        println!("No prior run to compare against; this run is the baseline");
        return;
    };

    for diff in &comparison.changed {
        if diff.is_content_only() {
            println!("  ~ {} (sample row changed)", diff.name);
        } else {
            println!(
                "  ~ {} (rows {} -> {}, max key {} -> {})",
                diff.name,
                diff.prior_row_count,
                diff.current_row_count,
                diff.prior_max_key.as_deref().unwrap_or("-"),
                diff.current_max_key.as_deref().unwrap_or("-")
            );
        }
    }
    for name in &comparison.added {
        println!("  + {}", name);
    }
    for name in &comparison.removed {
        println!("  - {}", name);
    }

    println!(
        "Status: {} ({} compared, {} changed, {} added, {} removed, new tables: {})",
        comparison.verdict,
        comparison.compared,
        comparison.changed.len(),
        comparison.added.len(),
        comparison.removed.len(),
        comparison.policy
    );
}

#[cfg(test)]
#[path = "verify_test.rs"]
mod tests;
