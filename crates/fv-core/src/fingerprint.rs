//! Fingerprint engine: turns a table's current state into a stable digest.
//!
//! A table fingerprint combines three cheap signals read live from the
//! database: the exact row count, the maximum identity key, and a digest of
//! one sampled row. Sampling failures degrade the result instead of failing
//! it, so one unreadable table never blocks the rest of a run.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::checksum::compute_checksum;
use crate::descriptor::TableDescriptor;
use crate::sampler::RowSampler;
use crate::value::SampleValue;

/// Fingerprint of one table in one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFingerprint {
    /// Table name, matching its descriptor
    pub name: String,

    /// Exact row count read live (0 if the count failed)
    #[serde(alias = "count_rows")]
    pub row_count: u64,

    /// Maximum identity key value
    #[serde(default, alias = "max_id", skip_serializing_if = "Option::is_none")]
    pub max_key: Option<String>,

    /// SHA-256 of the canonical sample row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_digest: Option<String>,

    /// Combined digest compared across runs
    #[serde(alias = "hash")]
    pub fingerprint: String,

    /// Wall-clock time spent on this table
    #[serde(default)]
    pub elapsed_ms: u64,

    /// Catalog row estimate at fingerprint time
    #[serde(default, alias = "schema_rows")]
    pub estimated_rows: u64,

    /// Catalog size at fingerprint time
    #[serde(default)]
    pub size_mb: f64,

    #[serde(default, alias = "column_size", skip_serializing_if = "Option::is_none")]
    pub column_count: Option<usize>,

    /// One line per degraded step
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl TableFingerprint {
    /// Fingerprint for a table that could not be sampled at all: zero rows,
    /// no key, no sample.
    pub fn unreadable(descriptor: &TableDescriptor, reason: impl Into<String>) -> Self {
        let name = descriptor.name.to_string();
        Self {
            fingerprint: combine_fingerprint(&name, 0, None, None),
            name,
            row_count: 0,
            max_key: None,
            sample_digest: None,
            elapsed_ms: 0,
            estimated_rows: descriptor.estimated_rows,
            size_mb: descriptor.size_mb,
            column_count: descriptor.column_count,
            warnings: vec![reason.into()],
        }
    }

    /// Whether any step degraded while fingerprinting this table
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Concatenate the canonical text of each value, in order, with no separator.
pub fn canonicalize_row(values: &[SampleValue]) -> String {
    values.iter().map(SampleValue::canonical_text).collect()
}

/// Digest of one sampled row
pub fn sample_digest(values: &[SampleValue]) -> String {
    compute_checksum(&canonicalize_row(values))
}

/// Combine the per-table signals into the final fingerprint.
///
/// Absent `max_key` and `sample_digest` contribute the empty string.
pub fn combine_fingerprint(
    name: &str,
    row_count: u64,
    max_key: Option<&str>,
    sample_digest: Option<&str>,
) -> String {
    let input = format!(
        "{}{}{}{}",
        name,
        row_count,
        max_key.unwrap_or_default(),
        sample_digest.unwrap_or_default()
    );
    compute_checksum(&input)
}

/// Fingerprint a single table. Never fails: each failed step is logged,
/// recorded as a warning, and leaves its field zeroed or absent.
pub async fn fingerprint_table(
    descriptor: &TableDescriptor,
    sampler: &dyn RowSampler,
) -> TableFingerprint {
    let started = Instant::now();
    let table = &descriptor.name;
    let mut warnings = Vec::new();

    let row_count = match sampler.count(table).await {
        Ok(count) => count,
        Err(e) => {
            log::warn!("{}: row count failed: {}", table, e);
            warnings.push(format!("count: {e}"));
            0
        }
    };
    log::debug!("{}: {} rows", table, row_count);

    let max_key = match (&descriptor.identity_key, row_count) {
        (Some(key_column), n) if n > 0 => match sampler.max_key(table, key_column).await {
            Ok(value) => value,
            Err(e) => {
                log::warn!("{}: max({}) failed: {}", table, key_column, e);
                warnings.push(format!("max_key: {e}"));
                None
            }
        },
        _ => None,
    };

    let sample_digest = if row_count > 0 {
        let key = descriptor
            .identity_key
            .as_deref()
            .zip(max_key.as_deref());
        match sampler.sample_row(descriptor, key).await {
            Ok(Some(values)) => Some(sample_digest(&values)),
            Ok(None) => {
                log::warn!("{}: sample query returned no row", table);
                warnings.push("sample: no row returned".to_string());
                None
            }
            Err(e) => {
                log::warn!("{}: sample query failed: {}", table, e);
                warnings.push(format!("sample: {e}"));
                None
            }
        }
    } else {
        None
    };

    let fingerprint = combine_fingerprint(
        table.as_str(),
        row_count,
        max_key.as_deref(),
        sample_digest.as_deref(),
    );

    TableFingerprint {
        name: table.to_string(),
        row_count,
        max_key,
        sample_digest,
        fingerprint,
        elapsed_ms: started.elapsed().as_millis() as u64,
        estimated_rows: descriptor.estimated_rows,
        size_mb: descriptor.size_mb,
        column_count: descriptor.column_count,
        warnings,
    }
}

#[cfg(test)]
#[path = "fingerprint_test.rs"]
mod tests;
