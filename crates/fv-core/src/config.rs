//! Configuration types and parsing for fv.
//!
//! A config file may be JSON (`.json`, and any other extension) or YAML
//! (`.yml` / `.yaml`). Every field is optional; the CLI layers its flags on
//! top of whatever the file provides.

use crate::compare::TableSetPolicy;
use crate::error::{CoreError, CoreResult};
use crate::serde_helpers::default_true;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Prior run report to compare against
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    /// Where to write this run's report
    #[serde(rename = "out", default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Table list file used instead of live catalog introspection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Column treated as the identity key when a table has no single-column
    /// primary key
    #[serde(default = "default_identity_column")]
    pub identity_column: String,

    /// Number of tables fingerprinted concurrently
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Treatment of tables added or removed since the prior run
    #[serde(default)]
    pub new_tables: TableSetPolicy,
}

/// Database connection configuration.
///
/// Besides the DuckDB file settings this accepts the legacy connection keys
/// (`host`, `port`, `user`, `password`, `database`) and pool limits, so
/// existing config files keep loading. `database` names the database file
/// when `path` is not set; the network keys have no meaning for a local file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB database file (`:memory:` for an empty in-memory database)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Schema whose tables are fingerprinted
    #[serde(default = "default_db_schema")]
    pub schema: String,

    /// Open the database read-only
    #[serde(default = "default_true")]
    pub read_only: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Database name, used as the file path when `path` is unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Upper bound on connections in use at once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_open_connections: Option<usize>,

    /// Upper bound on connections kept open while unused
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_idle_connections: Option<usize>,

    /// Seconds a connection may live before it is closed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_max_lifetime: Option<u64>,

    /// Seconds an unused connection is kept before it is closed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_max_idle_time: Option<u64>,
}

/// Default for `max_open_connections`
pub const DEFAULT_MAX_OPEN_CONNECTIONS: usize = 25;
/// Default for `max_idle_connections`
pub const DEFAULT_MAX_IDLE_CONNECTIONS: usize = 5;
/// Default for `connection_max_lifetime`, in seconds
pub const DEFAULT_CONNECTION_MAX_LIFETIME: u64 = 300;
/// Default for `connection_max_idle_time`, in seconds
pub const DEFAULT_CONNECTION_MAX_IDLE_TIME: u64 = 60;

/// Largest accepted `threads` / `max_open_connections` value
pub const MAX_WORKERS: usize = tokio::sync::Semaphore::MAX_PERMITS;

impl DatabaseConfig {
    /// File to open: `path`, falling back to `database`
    pub fn database_path(&self) -> Option<&str> {
        self.path
            .as_deref()
            .or(self.database.as_deref())
            .filter(|p| !p.is_empty())
    }

    /// Whether any network connection key is set
    pub fn has_network_settings(&self) -> bool {
        self.host.is_some() || self.port.is_some() || self.user.is_some() || self.password.is_some()
    }

    pub fn open_connection_limit(&self) -> usize {
        self.max_open_connections.unwrap_or(DEFAULT_MAX_OPEN_CONNECTIONS)
    }

    pub fn idle_connection_limit(&self) -> usize {
        self.max_idle_connections.unwrap_or(DEFAULT_MAX_IDLE_CONNECTIONS)
    }

    pub fn connection_lifetime(&self) -> Duration {
        Duration::from_secs(self.connection_max_lifetime.unwrap_or(DEFAULT_CONNECTION_MAX_LIFETIME))
    }

    pub fn connection_idle_time(&self) -> Duration {
        Duration::from_secs(self.connection_max_idle_time.unwrap_or(DEFAULT_CONNECTION_MAX_IDLE_TIME))
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            schema: default_db_schema(),
            read_only: true,
            host: None,
            port: None,
            user: None,
            password: None,
            database: None,
            max_open_connections: None,
            max_idle_connections: None,
            connection_max_lifetime: None,
            connection_max_idle_time: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            input: None,
            output: None,
            schema: None,
            identity_column: default_identity_column(),
            threads: default_threads(),
            new_tables: TableSetPolicy::default(),
        }
    }
}

fn default_db_schema() -> String {
    "main".to_string()
}

fn default_identity_column() -> String {
    "id".to_string()
}

fn default_threads() -> usize {
    1
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Values are not validated here: command-line overrides may still
    /// replace them. Call [`validate`](Self::validate) on the final config.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        if path.is_dir() {
            return Err(CoreError::NotAFile {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;

        let parsed = if is_yaml(path) {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        };
        let mut config: Config = parsed.map_err(|message| CoreError::ConfigParseError {
            path: path.display().to_string(),
            message,
        })?;

        // Legacy files write "" for unset paths
        for value in [&mut config.input, &mut config.output, &mut config.schema] {
            if value.as_deref() == Some("") {
                *value = None;
            }
        }
        Ok(config)
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> CoreResult<()> {
        if self.threads == 0 || self.threads > MAX_WORKERS {
            return Err(CoreError::ConfigInvalid {
                message: format!("threads must be between 1 and {}", MAX_WORKERS),
            });
        }
        let open = self.database.open_connection_limit();
        if open == 0 || open > MAX_WORKERS {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "database.max_open_connections must be between 1 and {}",
                    MAX_WORKERS
                ),
            });
        }
        if self.identity_column.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "identity_column must not be empty".to_string(),
            });
        }
        if self.database.schema.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.schema must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Serialize for `config-export`
    pub fn to_json_pretty(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the configuration as `config.json` inside `dir`, returning the
    /// written path
    pub fn export_to_dir(&self, dir: &Path) -> CoreResult<std::path::PathBuf> {
        std::fs::create_dir_all(dir).map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = dir.join("config.json");
        std::fs::write(&path, self.to_json_pretty()?).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
