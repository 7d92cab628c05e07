//! Run orchestration: fingerprint every table, aggregate, compare.

use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::compare::compare;
use crate::config::Config;
use crate::descriptor::TableDescriptor;
use crate::fingerprint::{fingerprint_table, TableFingerprint};
use crate::report::{Provenance, RunReportBuilder, RunResult};
use crate::sampler::RowSampler;

/// Everything a run needs, resolved once by the caller and borrowed by
/// every stage.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Resolved configuration
    pub config: Config,

    /// Tables to fingerprint, in processing order
    pub tables: Vec<TableDescriptor>,

    /// Comparison baseline, if one was loaded
    pub prior: Option<RunResult>,
}

impl RunContext {
    pub fn new(config: Config, tables: Vec<TableDescriptor>, prior: Option<RunResult>) -> Self {
        Self {
            config,
            tables,
            prior,
        }
    }

    /// Provenance recorded in the run report
    pub fn provenance(&self) -> Provenance {
        Provenance {
            input: self.config.input.clone().unwrap_or_default(),
            output: self.config.output.clone().unwrap_or_default(),
            schema: self.config.schema.clone().unwrap_or_default(),
        }
    }
}

/// Fingerprint all tables in `ctx`, compare against the prior run, and
/// return the sealed report.
///
/// With `threads == 1` tables are processed strictly one after another.
/// With more threads, up to `threads` tables are in flight at once; each
/// table's queries still run in order inside its own task and results are
/// aggregated here, by the caller's task only.
///
/// `on_table` is called once per finished table, in aggregation order.
pub async fn execute<F>(ctx: &RunContext, sampler: Arc<dyn RowSampler>, mut on_table: F) -> RunResult
where
    F: FnMut(&TableFingerprint),
{
    let mut builder = RunReportBuilder::new(ctx.provenance());

    // Never more workers than tables, and never past the semaphore's limit
    let workers = ctx
        .config
        .threads
        .min(ctx.tables.len())
        .min(Semaphore::MAX_PERMITS);

    if workers <= 1 {
        for descriptor in &ctx.tables {
            let fp = fingerprint_table(descriptor, sampler.as_ref()).await;
            log_table(&fp);
            on_table(&fp);
            builder.record(fp);
        }
    } else {
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut handles = Vec::with_capacity(ctx.tables.len());

        for descriptor in &ctx.tables {
            let task_descriptor = descriptor.clone();
            let sampler = Arc::clone(&sampler);
            let semaphore = Arc::clone(&semaphore);

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return TableFingerprint::unreadable(
                            &task_descriptor,
                            "worker pool closed before the table was read",
                        )
                    }
                };
                fingerprint_table(&task_descriptor, sampler.as_ref()).await
            });
            handles.push((descriptor, handle));
        }

        for (descriptor, handle) in handles {
            let fp = match handle.await {
                Ok(fp) => fp,
                Err(e) => {
                    log::warn!("{}: fingerprint task failed: {}", descriptor.name, e);
                    TableFingerprint::unreadable(descriptor, format!("task: {e}"))
                }
            };
            log_table(&fp);
            on_table(&fp);
            builder.record(fp);
        }
    }

    let comparison = compare(builder.current(), ctx.prior.as_ref(), ctx.config.new_tables);
    let result = builder.finish(comparison);
    log::info!(
        "run {} fingerprinted {} tables in {} ms",
        result.run_id,
        result.tables.len(),
        result.duration_ms
    );
    result
}

fn log_table(fp: &TableFingerprint) {
    log::info!(
        "{}: {} rows, max key {}, {} ms",
        fp.name,
        fp.row_count,
        fp.max_key.as_deref().unwrap_or("-"),
        fp.elapsed_ms
    );
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
