//! Comparator: diffs the current run's fingerprints against a prior run.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::report::RunResult;

/// Final classification of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Every compared table has the same fingerprint
    #[serde(rename = "MATCH")]
    Match,
    /// At least one compared table differs
    #[serde(rename = "NOT_MATCH", alias = "NOT MATCH")]
    NotMatch,
}

impl Verdict {
    /// Status string stored in a run report
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Match => "MATCH",
            Verdict::NotMatch => "NOT_MATCH",
        }
    }

    /// Parse a stored status; accepts the legacy `NOT MATCH` spelling
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MATCH" => Some(Verdict::Match),
            "NOT_MATCH" | "NOT MATCH" => Some(Verdict::NotMatch),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How tables present in only one of the two runs are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSetPolicy {
    /// Skip added and removed tables silently
    Ignore,
    /// List added and removed tables without affecting the verdict
    #[default]
    Report,
    /// Added or removed tables make the verdict `NOT_MATCH`
    Strict,
}

impl fmt::Display for TableSetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSetPolicy::Ignore => write!(f, "ignore"),
            TableSetPolicy::Report => write!(f, "report"),
            TableSetPolicy::Strict => write!(f, "strict"),
        }
    }
}

/// A table whose fingerprint differs between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDiff {
    pub name: String,
    pub prior_fingerprint: String,
    pub current_fingerprint: String,
    pub prior_row_count: u64,
    pub current_row_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_max_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_max_key: Option<String>,
}

impl TableDiff {
    /// Whether only the sampled row content differs (count and key unchanged)
    pub fn is_content_only(&self) -> bool {
        self.prior_row_count == self.current_row_count && self.prior_max_key == self.current_max_key
    }
}

/// Outcome of comparing two runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub verdict: Verdict,

    /// Policy the report was produced under
    pub policy: TableSetPolicy,

    /// Number of tables present in both runs
    pub compared: usize,

    /// Tables whose fingerprints differ, sorted by name
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed: Vec<TableDiff>,

    /// Tables only in the current run (empty under `ignore`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,

    /// Tables only in the prior run (empty under `ignore`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<String>,
}

/// Compare `current` against `prior`.
///
/// Returns `None` when there is no prior run: a first run only establishes a
/// baseline. Comparison is driven by the current run's tables.
pub fn compare(
    current: &RunResult,
    prior: Option<&RunResult>,
    policy: TableSetPolicy,
) -> Option<ComparisonReport> {
    let prior = prior?;

    let mut compared = 0;
    let mut changed = Vec::new();
    let mut added = Vec::new();

    for (name, cur) in &current.tables {
        let Some(prev) = prior.tables.get(name) else {
            added.push(name.clone());
            continue;
        };
        compared += 1;
        if cur.fingerprint != prev.fingerprint {
            changed.push(TableDiff {
                name: name.clone(),
                prior_fingerprint: prev.fingerprint.clone(),
                current_fingerprint: cur.fingerprint.clone(),
                prior_row_count: prev.row_count,
                current_row_count: cur.row_count,
                prior_max_key: prev.max_key.clone(),
                current_max_key: cur.max_key.clone(),
            });
        }
    }

    let mut removed: Vec<String> = prior
        .tables
        .keys()
        .filter(|name| !current.tables.contains_key(*name))
        .cloned()
        .collect();

    if policy == TableSetPolicy::Ignore {
        added.clear();
        removed.clear();
    }
    added.sort();
    removed.sort();

    let membership_changed = !added.is_empty() || !removed.is_empty();
    let verdict = if !changed.is_empty() || (policy == TableSetPolicy::Strict && membership_changed)
    {
        Verdict::NotMatch
    } else {
        Verdict::Match
    };

    for name in &added {
        log::info!("table {} is new since the prior run", name);
    }
    for name in &removed {
        log::info!("table {} is missing from the current run", name);
    }

    Some(ComparisonReport {
        verdict,
        policy,
        compared,
        changed,
        added,
        removed,
    })
}

#[cfg(test)]
#[path = "compare_test.rs"]
mod tests;
