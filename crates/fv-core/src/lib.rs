//! fv-core - Core library for the fv table fingerprint verifier
//!
//! This crate provides the table descriptor and fingerprint types, the
//! fingerprint engine, the run comparator, run report persistence, and the
//! configuration shared by the `fv` components. Database access is abstracted
//! behind the [`RowSampler`] trait so this crate never talks to a database
//! directly.

pub mod checksum;
pub mod compare;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod fingerprint;
pub mod report;
pub mod run;
pub mod sampler;
pub(crate) mod serde_helpers;
pub mod table_list;
pub mod table_name;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod value;

pub use checksum::compute_checksum;
pub use compare::{compare, ComparisonReport, TableDiff, TableSetPolicy, Verdict};
pub use config::{Config, DatabaseConfig};
pub use descriptor::{TableColumn, TableDescriptor};
pub use error::{CoreError, CoreResult};
pub use fingerprint::{
    canonicalize_row, combine_fingerprint, fingerprint_table, sample_digest, TableFingerprint,
};
pub use report::{load_prior, Provenance, RunReportBuilder, RunResult};
pub use run::RunContext;
pub use sampler::{RowSampler, SampleError, SampleResult};
pub use table_name::TableName;
pub use value::SampleValue;
