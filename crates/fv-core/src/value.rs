//! Column values read from a sampled row.

/// A single column value as produced by a [`RowSampler`](crate::RowSampler).
///
/// The set of cases is closed: samplers map every engine type onto one of
/// these variants, and canonicalization matches on them exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    /// SQL NULL
    Null,
    /// Character data, kept byte-for-byte
    Text(String),
    /// Any integral number
    Integer(i128),
    /// Floating point number
    Float(f64),
    /// Blob / binary data
    Binary(Vec<u8>),
}

impl SampleValue {
    /// Render this value in its canonical text form.
    ///
    /// NULL renders as the empty string. Binary data is decoded as (lossy)
    /// UTF-8 and trimmed of surrounding whitespace.
    pub fn canonical_text(&self) -> String {
        match self {
            SampleValue::Null => String::new(),
            SampleValue::Text(s) => s.clone(),
            SampleValue::Integer(n) => n.to_string(),
            SampleValue::Float(f) => f.to_string(),
            SampleValue::Binary(bytes) => String::from_utf8_lossy(bytes).trim().to_string(),
        }
    }

    /// Whether this value is SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, SampleValue::Null)
    }
}

impl From<&str> for SampleValue {
    fn from(s: &str) -> Self {
        SampleValue::Text(s.to_string())
    }
}

impl From<String> for SampleValue {
    fn from(s: String) -> Self {
        SampleValue::Text(s)
    }
}

impl From<i64> for SampleValue {
    fn from(n: i64) -> Self {
        SampleValue::Integer(n as i128)
    }
}

impl From<f64> for SampleValue {
    fn from(f: f64) -> Self {
        SampleValue::Float(f)
    }
}

impl<T: Into<SampleValue>> From<Option<T>> for SampleValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SampleValue::Null, Into::into)
    }
}
