// crates/warden-cli/src/config.rs
//
// Operator configuration for the Warden CLI.
// Loaded from a TOML file or populated with sensible defaults.

use serde::{Deserialize, Serialize};
use std::fs;

use warden_reputation::{InitialReputation, ReputationConfig};
use warden_store::rocks::DEFAULT_LOCK_TIMEOUT_MS;

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardenConfig {
    /// Directory holding the reputation RocksDB.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// How long a transaction waits for another writer's lock on the same
    /// node before failing.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: i64,

    /// Scoring, vetting, and suspension parameters.
    #[serde(default)]
    pub reputation: ReputationConfig,

    /// Starting Beta parameters for new records.
    #[serde(default)]
    pub initial_reputation: InitialReputation,
}

fn default_data_dir() -> String {
    "~/.warden/data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_lock_timeout_ms() -> i64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            lock_timeout_ms: default_lock_timeout_ms(),
            reputation: ReputationConfig::default(),
            initial_reputation: InitialReputation::default(),
        }
    }
}

impl WardenConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(expand_tilde(path))?;
        let config: WardenConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Path of the reputation database under `data_dir`.
    pub fn db_path(&self) -> String {
        format!("{}/reputation_rocksdb", expand_tilde(&self.data_dir))
    }
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{}", home.display(), &path[1..]);
        }
    }
    path.to_string()
}
