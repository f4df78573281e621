//! Layered configuration
//!
//! Precedence, lowest first: built-in defaults, the user config file
//! (`<config dir>/tdesk/config.yaml`), `./tdesk.yaml` (or an explicit path),
//! then the `TDESK_DB` / `TDESK_LOG` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Local config file picked up from the working directory
pub const LOCAL_CONFIG_FILE: &str = "tdesk.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file
    pub path: PathBuf,

    /// How long a writer waits on a locked database before failing
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("tdesk.db"),
            busy_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Page size used when the caller does not give one
    pub default_limit: u32,

    /// Largest page size a caller may ask for
    pub max_limit: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            max_limit: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Reject status updates that skip the lifecycle order.
    /// Off by default: any status may be set from any other.
    pub enforce_transitions: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub listing: ListingConfig,
    pub workflow: WorkflowConfig,
    pub log: LogConfig,
}

impl Config {
    /// Load configuration, failing on unreadable or malformed files
    ///
    /// `explicit` replaces `./tdesk.yaml` and must exist.
    pub fn try_load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut merged = serde_yml::Value::Mapping(serde_yml::Mapping::new());

        if let Some(user_file) = user_config_path() {
            if user_file.exists() {
                merge_values(&mut merged, read_yaml(&user_file)?);
            }
        }

        match explicit {
            Some(path) => merge_values(&mut merged, read_yaml(path)?),
            None => {
                let local = PathBuf::from(LOCAL_CONFIG_FILE);
                if local.exists() {
                    merge_values(&mut merged, read_yaml(&local)?);
                }
            }
        }

        let mut config: Config =
            serde_yml::from_value(merged).map_err(|e| ConfigError::Parse {
                path: explicit
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE)),
                message: e.to_string(),
            })?;

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a single YAML document on top of the defaults
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yml::from_str(yaml).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(db) = lookup("TDESK_DB").filter(|v| !v.is_empty()) {
            self.database.path = PathBuf::from(db);
        }
        if let Some(filter) = lookup("TDESK_LOG").filter(|v| !v.is_empty()) {
            self.log.filter = filter;
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "tdesk").map(|dirs| dirs.config_dir().join("config.yaml"))
}

fn read_yaml(path: &Path) -> Result<serde_yml::Value, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Deep-merge `overlay` into `base`; mappings merge key by key, anything else replaces
fn merge_values(base: &mut serde_yml::Value, overlay: serde_yml::Value) {
    match (base, overlay) {
        (serde_yml::Value::Mapping(base_map), serde_yml::Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (_, serde_yml::Value::Null) => {}
        (base, overlay) => *base = overlay,
    }
}
