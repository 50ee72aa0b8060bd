//! Runtime configuration, read from a JSON file.
//!
//! Every key is optional. Without a `remote` section the ledger runs on the
//! local SQLite file only.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "PAWN_LEDGER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Connection settings for the networked MySQL store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDbConfig {
    pub host: String,
    #[serde(default = "default_mysql_port")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub database: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub remote: Option<RemoteDbConfig>,
    /// Local SQLite file used when no remote store is reachable
    pub local_db_path: PathBuf,
    pub listen_addr: String,
    /// Origin allowed to call the REST API from a browser
    pub allowed_origin: String,
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            remote: None,
            local_db_path: PathBuf::from("pawn.db"),
            listen_addr: "127.0.0.1:3000".to_string(),
            allowed_origin: "http://localhost:8080".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Load from `path`. A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: LedgerConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Config path from `PAWN_LEDGER_CONFIG`, falling back to `config.json`
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}
