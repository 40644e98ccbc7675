//! Configuration loading and management.
//!
//! Settings come from, lowest precedence first: built-in defaults, a YAML
//! file, `TASK_API_*` environment variables, and CLI flags (applied by the
//! caller through [`crate::cli::Cli::apply_overrides`]).

use crate::db::DEFAULT_BUSY_TIMEOUT_MS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "task-api.yaml";

pub const ENV_HOST: &str = "TASK_API_HOST";
pub const ENV_PORT: &str = "TASK_API_PORT";
pub const ENV_DB_PATH: &str = "TASK_API_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "TASK_API_BUSY_TIMEOUT_MS";

/// Server configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

/// Server-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface the HTTP listener binds to.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// How long a connection waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_db_path() -> PathBuf {
    PathBuf::from("tasks.db")
}

fn default_busy_timeout_ms() -> u32 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration and apply environment overrides.
    ///
    /// An explicit path must exist. Without one, `task-api.yaml` in the
    /// working directory is used if present, otherwise defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Apply `TASK_API_*` overrides using the given variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.server.host = host;
        }

        if let Some(db_path) = lookup(ENV_DB_PATH) {
            self.server.db_path = PathBuf::from(db_path);
        }

        if let Some(port) = lookup(ENV_PORT) {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid {}", ENV_PORT),
            }
        }

        if let Some(timeout) = lookup(ENV_BUSY_TIMEOUT_MS) {
            match timeout.parse() {
                Ok(timeout) => self.server.busy_timeout_ms = timeout,
                Err(_) => warn!(value = %timeout, "Ignoring invalid {}", ENV_BUSY_TIMEOUT_MS),
            }
        }
    }

    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.server.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
