//! Shared test utilities for fv-core

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::descriptor::TableDescriptor;
use crate::fingerprint::TableFingerprint;
use crate::sampler::{RowSampler, SampleError, SampleResult};
use crate::table_name::TableName;
use crate::value::SampleValue;

#[derive(Debug, Clone, Default)]
struct MemTable {
    columns: Vec<String>,
    rows: Vec<Vec<SampleValue>>,
    failing: bool,
}

/// In-memory [`RowSampler`] whose tables can be edited between runs.
#[derive(Debug, Default)]
pub(crate) struct MemorySampler {
    tables: Mutex<HashMap<String, MemTable>>,
}

impl MemorySampler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a table with the given columns and rows
    pub(crate) fn with_table(self, name: &str, columns: &[&str], rows: Vec<Vec<SampleValue>>) -> Self {
        self.lock().insert(
            name.to_string(),
            MemTable {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows,
                failing: false,
            },
        );
        self
    }

    /// Table `(id, label)` holding `n` rows with ids 1..=n
    pub(crate) fn with_id_table(self, name: &str, n: i64) -> Self {
        let rows = (1..=n)
            .map(|i| vec![SampleValue::from(i), SampleValue::from(format!("{name}-{i}"))])
            .collect();
        self.with_table(name, &["id", "label"], rows)
    }

    pub(crate) fn push_row(&self, name: &str, row: Vec<SampleValue>) {
        if let Some(table) = self.lock().get_mut(name) {
            table.rows.push(row);
        }
    }

    /// Make every query against `name` fail
    pub(crate) fn fail_table(&self, name: &str) {
        self.lock().entry(name.to_string()).or_default().failing = true;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, MemTable>> {
        self.tables.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn table(&self, name: &TableName) -> SampleResult<MemTable> {
        match self.lock().get(name.as_str()) {
            Some(t) if t.failing => Err(SampleError::Connection(format!(
                "connection reset while reading {name}"
            ))),
            Some(t) => Ok(t.clone()),
            None => Err(SampleError::Query(format!("Table with name {name} does not exist"))),
        }
    }
}

fn key_index(table: &MemTable, key_column: &str) -> SampleResult<usize> {
    table
        .columns
        .iter()
        .position(|c| c == key_column)
        .ok_or_else(|| SampleError::Query(format!("column {key_column} not found")))
}

#[async_trait]
impl RowSampler for MemorySampler {
    async fn count(&self, table: &TableName) -> SampleResult<u64> {
        Ok(self.table(table)?.rows.len() as u64)
    }

    async fn max_key(&self, table: &TableName, key_column: &str) -> SampleResult<Option<String>> {
        let t = self.table(table)?;
        let idx = key_index(&t, key_column)?;
        Ok(t.rows
            .iter()
            .filter_map(|row| match &row[idx] {
                SampleValue::Integer(n) => Some(*n),
                _ => None,
            })
            .max()
            .map(|n| n.to_string()))
    }

    async fn sample_row(
        &self,
        table: &TableDescriptor,
        key: Option<(&str, &str)>,
    ) -> SampleResult<Option<Vec<SampleValue>>> {
        let t = self.table(&table.name)?;
        match key {
            Some((column, value)) => {
                let idx = key_index(&t, column)?;
                Ok(t.rows
                    .into_iter()
                    .find(|row| row[idx].canonical_text() == value))
            }
            None => Ok(t.rows.into_iter().next()),
        }
    }
}

/// Descriptor for a table with an `id` identity key
pub(crate) fn keyed(name: &str) -> TableDescriptor {
    TableDescriptor::bare(TableName::new(name)).with_identity_key("id")
}

/// Hand-built fingerprint for comparator tests
pub(crate) fn fp(name: &str, row_count: u64, fingerprint: &str) -> TableFingerprint {
    TableFingerprint {
        name: name.to_string(),
        row_count,
        max_key: None,
        sample_digest: None,
        fingerprint: fingerprint.to_string(),
        elapsed_ms: 0,
        estimated_rows: 0,
        size_mb: 0.0,
        column_count: None,
        warnings: Vec::new(),
    }
}
