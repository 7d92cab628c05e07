//! CLI command implementations

pub(crate) mod common;
pub(crate) mod config_export;
pub(crate) mod schema_export;
pub(crate) mod verify;
