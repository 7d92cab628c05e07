//! Flat table list files.
//!
//! One table per line; only the first comma-separated field is read, so a
//! file written by [`write_table_list`] can be fed back in. Blank lines and
//! lines starting with `#` are skipped. Names may be `schema.table`, with
//! double quotes around a part that itself contains `.` or `,`. Unqualified
//! names belong to the configured schema.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use crate::descriptor::TableDescriptor;
use crate::error::{CoreError, CoreResult};
use crate::table_name::TableName;

/// Header line written by [`write_table_list`]
pub const TABLE_LIST_HEADER: &str = "# name,estimated_rows,size_mb,column_count,identity_key";

/// Parse table list content into bare descriptors (no column metadata).
/// Unqualified names are placed in `schema`.
pub fn parse_table_list(content: &str, schema: &str) -> Vec<TableDescriptor> {
    let mut seen = HashSet::new();
    let mut tables = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(name) = TableName::try_new(first_field(line).trim()) else {
            continue;
        };
        let name = name.with_default_schema(schema);
        if !seen.insert(name.clone()) {
            log::warn!("duplicate table '{}' in table list; ignoring", name);
            continue;
        }
        tables.push(TableDescriptor::bare(name));
    }

    tables
}

/// Text before the first comma that is not inside double quotes
fn first_field(line: &str) -> &str {
    let mut quoted = false;
    for (idx, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => return &line[..idx],
            _ => {}
        }
    }
    line
}

/// Read a table list file, placing unqualified names in `schema`
pub fn load_table_list(path: &Path, schema: &str) -> CoreResult<Vec<TableDescriptor>> {
    if !path.exists() {
        return Err(CoreError::TableListNotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(parse_table_list(&content, schema))
}

/// Render descriptors in table list format
pub fn format_table_list(tables: &[TableDescriptor]) -> String {
    let mut out = String::new();
    out.push_str(TABLE_LIST_HEADER);
    out.push('\n');
    for t in tables {
        let _ = writeln!(
            out,
            "{},{},{:.2},{},{}",
            t.name.to_qualified_text(),
            t.estimated_rows,
            t.size_mb,
            t.column_count.map(|c| c.to_string()).unwrap_or_default(),
            t.identity_key.as_deref().unwrap_or_default()
        );
    }
    out
}

/// Write descriptors to `path` in table list format
pub fn write_table_list(path: &Path, tables: &[TableDescriptor]) -> CoreResult<()> {
    std::fs::write(path, format_table_list(tables)).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })
}
