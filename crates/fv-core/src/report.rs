//! Run reports: aggregation of table fingerprints and their persistence.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

use crate::compare::{ComparisonReport, Verdict};
use crate::error::{CoreError, CoreResult};
use crate::fingerprint::TableFingerprint;
use crate::serde_helpers;

/// Where a run's inputs and outputs came from. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
    pub input: String,
    pub output: String,
    pub schema: String,
}

/// The result of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Short identifier for this run
    #[serde(default)]
    pub run_id: String,

    /// Prior snapshot path
    #[serde(rename = "in", default)]
    pub input: String,

    /// Output path this report was written to
    #[serde(rename = "out", default)]
    pub output: String,

    /// Table list file, empty when the live catalog was used
    #[serde(default)]
    pub schema: String,

    /// Run start (epoch seconds)
    #[serde(default)]
    pub start: i64,

    /// Run end (epoch seconds)
    #[serde(default)]
    pub end: i64,

    #[serde(default)]
    pub duration_ms: u64,

    /// Fingerprints keyed by table name
    #[serde(default)]
    pub tables: BTreeMap<String, TableFingerprint>,

    /// `MATCH`, `NOT_MATCH`, or empty when no prior run was compared
    #[serde(default, with = "serde_helpers::status")]
    pub status: Option<Verdict>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonReport>,
}

impl RunResult {
    /// Tables with at least one degraded fingerprint step
    pub fn degraded_tables(&self) -> Vec<&TableFingerprint> {
        self.tables.values().filter(|t| t.is_degraded()).collect()
    }

    /// Load a run report, returning `None` if the file does not exist
    pub fn load(path: &Path) -> CoreResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        if path.is_dir() {
            return Err(CoreError::NotAFile {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let result = serde_json::from_str(&content).map_err(|e| CoreError::ReportParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(result))
    }

    /// Save the report atomically.
    ///
    /// Writes to a temp file (suffixed with the PID) and renames it over
    /// the target.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::IoWithPath {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let temp_path = path.with_extension(format!("json.{}.tmp", std::process::id()));
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&temp_path, &json).map_err(|e| CoreError::IoWithPath {
            path: temp_path.display().to_string(),
            source: e,
        })?;
        std::fs::rename(&temp_path, path).map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            CoreError::IoWithPath {
                path: path.display().to_string(),
                source: e,
            }
        })?;
        Ok(())
    }
}

/// Load the prior snapshot used as the comparison baseline.
///
/// A missing snapshot means this is a baseline run. An unreadable or
/// malformed snapshot is logged and treated the same way.
pub fn load_prior(path: &Path) -> Option<RunResult> {
    match RunResult::load(path) {
        Ok(Some(prior)) => {
            log::info!(
                "loaded prior run {} ({} tables) from {}",
                prior.run_id,
                prior.tables.len(),
                path.display()
            );
            Some(prior)
        }
        Ok(None) => {
            log::info!("no prior run at {}; this run is a baseline", path.display());
            None
        }
        Err(e) => {
            log::warn!("ignoring prior run: {}", e);
            None
        }
    }
}

/// Aggregates table fingerprints into a [`RunResult`].
pub struct RunReportBuilder {
    result: RunResult,
    started: Instant,
}

impl RunReportBuilder {
    /// Start a new report, stamping the start time
    pub fn new(provenance: Provenance) -> Self {
        Self {
            result: RunResult {
                run_id: Uuid::new_v4().to_string()[..8].to_string(),
                input: provenance.input,
                output: provenance.output,
                schema: provenance.schema,
                start: Utc::now().timestamp(),
                end: 0,
                duration_ms: 0,
                tables: BTreeMap::new(),
                status: None,
                comparison: None,
            },
            started: Instant::now(),
        }
    }

    /// Record one table's fingerprint. A second fingerprint for the same
    /// table replaces the first.
    pub fn record(&mut self, fingerprint: TableFingerprint) {
        let name = fingerprint.name.clone();
        if self.result.tables.insert(name.clone(), fingerprint).is_some() {
            log::warn!("table {} fingerprinted twice; keeping the latest", name);
        }
    }

    /// Fingerprints recorded so far
    pub fn current(&self) -> &RunResult {
        &self.result
    }

    /// Seal the report with end time, duration and comparison outcome
    pub fn finish(mut self, comparison: Option<ComparisonReport>) -> RunResult {
        self.result.end = Utc::now().timestamp();
        self.result.duration_ms = self.started.elapsed().as_millis() as u64;
        self.result.status = comparison.as_ref().map(|c| c.verdict);
        self.result.comparison = comparison;
        self.result
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
