//! Strongly-typed table name wrapper.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

/// Name of a table being fingerprinted.
///
/// The display form (`table`, or `schema.table` outside `main`) is what
/// reports are keyed by. Schema and table are kept as separate parts so a
/// table name that itself contains a `.` is never re-split when queried.
/// Equality, ordering and hashing use the display form only.
#[derive(Debug, Clone)]
pub struct TableName {
    display: String,
    schema: Option<String>,
    table: String,
}

impl TableName {
    /// Create a new `TableName`, panicking if the name is empty.
    ///
    /// Prefer [`try_new`](Self::try_new) when handling untrusted input.
    pub fn new(name: impl Into<String>) -> Self {
        match Self::try_new(name) {
            Some(name) => name,
            None => panic!("TableName must not be empty"),
        }
    }

    /// Parse a possibly qualified name, returning `None` if it is empty.
    ///
    /// The first `.` outside double quotes separates schema from table, so
    /// `main.v1.orders` is the table `v1.orders` in `main` and
    /// `"my.s".orders` is the table `orders` in `my.s`. Either part may be
    /// double-quoted, with `""` standing for an embedded quote. A `main.`
    /// prefix is dropped from the display form. Text that does not parse as
    /// `schema.table` is taken as an unqualified table name.
    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let text = name.into();
        if text.is_empty() {
            return None;
        }
        match split_qualified(&text) {
            Some((Some(schema), table)) => Self::in_schema(&schema, table),
            Some((None, table)) if !table.is_empty() => Some(Self::unqualified(table)),
            _ => Some(Self::unqualified(text)),
        }
    }

    fn unqualified(table: String) -> Self {
        Self {
            display: table.clone(),
            table,
            schema: None,
        }
    }

    /// Place an unqualified name in `schema`; qualified names are kept
    pub fn with_default_schema(self, schema: &str) -> Self {
        if self.schema.is_some() {
            return self;
        }
        match Self::in_schema(schema, self.table.as_str()) {
            Some(name) => name,
            None => self,
        }
    }

    /// Name for `table` in `schema` as read from a catalog. Tables in
    /// `main` display unqualified.
    pub fn in_schema(schema: &str, table: impl Into<String>) -> Option<Self> {
        let table = table.into();
        if table.is_empty() || schema.is_empty() {
            return None;
        }
        let display = if schema == "main" {
            table.clone()
        } else {
            format!("{schema}.{table}")
        };
        Some(Self {
            display,
            schema: Some(schema.to_string()),
            table,
        })
    }

    /// Return the display name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Schema part; unqualified names belong to `main`
    pub fn schema(&self) -> &str {
        self.schema.as_deref().unwrap_or("main")
    }

    /// Table part, never split further
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Text form that parses back to the same schema and table parts.
    ///
    /// Unqualified names are written bare. A part containing `.`, `"` or `,`
    /// is double-quoted so it is never re-split.
    pub fn to_qualified_text(&self) -> String {
        match &self.schema {
            None => quote_part(&self.table),
            Some(schema) if schema == "main" && !needs_quotes(&self.table) => {
                self.table.clone()
            }
            Some(schema) => format!("{}.{}", quote_part(schema), quote_part(&self.table)),
        }
    }
}

fn needs_quotes(part: &str) -> bool {
    part.contains(['.', '"', ','])
}

fn quote_part(part: &str) -> String {
    if needs_quotes(part) {
        format!("\"{}\"", part.replace('"', "\"\""))
    } else {
        part.to_string()
    }
}

/// Read one identifier from the start of `text`: a double-quoted run, or
/// everything up to the first `.`. Returns the identifier and the rest.
fn read_part(text: &str) -> Option<(String, &str)> {
    let Some(quoted) = text.strip_prefix('"') else {
        let end = text.find('.').unwrap_or(text.len());
        return Some((text[..end].to_string(), &text[end..]));
    };
    let mut part = String::new();
    let mut chars = quoted.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c != '"' {
            part.push(c);
            continue;
        }
        if matches!(chars.peek(), Some((_, '"'))) {
            chars.next();
            part.push('"');
            continue;
        }
        return Some((part, &quoted[idx + 1..]));
    }
    None
}

/// Split `schema.table` text; `None` schema for a single part
fn split_qualified(text: &str) -> Option<(Option<String>, String)> {
    let (first, rest) = read_part(text)?;
    if rest.is_empty() {
        return Some((None, first));
    }
    let second = rest.strip_prefix('.')?;
    if first.is_empty() || second.is_empty() {
        return None;
    }
    if second.starts_with('"') {
        let (table, tail) = read_part(second)?;
        return tail.is_empty().then_some((Some(first), table));
    }
    Some((Some(first), second.to_string()))
}

impl PartialEq for TableName {
    fn eq(&self, other: &Self) -> bool {
        self.display == other.display
    }
}

impl Eq for TableName {}

impl Hash for TableName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.display.hash(state);
    }
}

impl PartialOrd for TableName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TableName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.display.cmp(&other.display)
    }
}

impl Serialize for TableName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.display)
    }
}

impl<'de> Deserialize<'de> for TableName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TableName::try_new(s).ok_or_else(|| serde::de::Error::custom("TableName must not be empty"))
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.display
    }
}

impl Deref for TableName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.display
    }
}

impl Borrow<str> for TableName {
    fn borrow(&self) -> &str {
        &self.display
    }
}

impl PartialEq<str> for TableName {
    fn eq(&self, other: &str) -> bool {
        self.display == other
    }
}

impl PartialEq<&str> for TableName {
    fn eq(&self, other: &&str) -> bool {
        self.display == *other
    }
}
