//! Table descriptors produced by a catalog reader or table list file.

use serde::{Deserialize, Serialize};

use crate::table_name::TableName;

/// One column as listed by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub name: String,
    /// Declared type, as the engine spells it
    pub data_type: String,
}

impl TableColumn {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Catalog metadata for one table, produced once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name, unique within a schema
    pub name: TableName,

    /// Row estimate from catalog statistics (may be stale)
    #[serde(default)]
    pub estimated_rows: u64,

    /// Storage size in megabytes
    #[serde(default)]
    pub size_mb: f64,

    /// Number of columns, when the catalog provided them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_count: Option<usize>,

    /// Single-column identity key, if one is known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_key: Option<String>,

    /// Columns in table order; empty when the source carried none
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<TableColumn>,
}

impl TableDescriptor {
    /// Descriptor with no catalog metadata (e.g. from a flat table list)
    pub fn bare(name: TableName) -> Self {
        Self {
            name,
            estimated_rows: 0,
            size_mb: 0.0,
            column_count: None,
            identity_key: None,
            columns: Vec::new(),
        }
    }

    /// Builder-style setter for the identity key column
    pub fn with_identity_key(mut self, column: impl Into<String>) -> Self {
        self.identity_key = Some(column.into());
        self
    }

    /// Builder-style setter for the catalog column list
    pub fn with_columns(mut self, columns: Vec<TableColumn>) -> Self {
        self.column_count = Some(columns.len());
        self.columns = columns;
        self
    }

    /// Whether a single-column identity key is known for this table
    pub fn has_identity_key(&self) -> bool {
        self.identity_key.is_some()
    }
}
