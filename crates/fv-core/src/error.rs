//! Error types for fv-core

use thiserror::Error;

/// Core error type for fv
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config {path}: {message}")]
    ConfigParseError { path: String, message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Table list file not found
    #[error("[E004] Table list not found: {path}")]
    TableListNotFound { path: String },

    /// E005: Run report could not be parsed
    #[error("[E005] Failed to parse run report {path}: {message}")]
    ReportParseError { path: String, message: String },

    /// E006: Path exists but is a directory
    #[error("[E006] Expected a file but found a directory: {path}")]
    NotAFile { path: String },

    /// E016: IO error with file path context
    #[error("[E016] Failed to access '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
