//! Shared serde helper functions used across multiple modules.

/// Serde default function that returns `true`.
pub fn default_true() -> bool {
    true
}

/// (De)serialize an optional verdict as a plain status string, with `""`
/// standing for "not compared".
pub mod status {
    use crate::compare::Verdict;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Verdict>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.map_or("", |v| v.as_str()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Verdict>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        if s.is_empty() {
            return Ok(None);
        }
        Verdict::parse(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown status '{s}'")))
    }
}
