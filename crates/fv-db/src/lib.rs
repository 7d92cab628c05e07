//! fv-db - Database layer for fv
//!
//! This crate provides the `Database` traits and the DuckDB backend that
//! reads table descriptors from the live catalog and implements the
//! [`fv_core::RowSampler`] queries used to fingerprint each table.

pub mod duckdb;
pub mod error;
pub mod sql_utils;
pub mod traits;

pub use duckdb::{DuckDbBackend, PoolSettings};
pub use error::{DbError, DbResult};
pub use traits::{Database, DatabaseCatalog, DatabaseCore};
