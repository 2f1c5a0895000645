//! Configuration for the Gizo SDK.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $GIZO_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/gizo/config.toml
//!   3. ~/.config/gizo/config.toml
//!
//! The config is resolved once and handed to the bootstrapper; nothing in the
//! SDK reads process-wide defaults after that.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Discovery service for the main network.
pub const CENTRUM: &str = "https://centrum.gizo.network";
/// Discovery service for the test network.
pub const CENTRUM_TESTNET: &str = "https://centrum-testnet.gizo.network";

const STATE_FILE: &str = ".gizo";
const STATE_FILE_TESTNET: &str = ".gizo-test";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GizoConfig {
    /// Dispatcher to connect to instead of asking the registry. Only used
    /// when no state file exists yet.
    pub dispatcher: Option<String>,
    /// Where connection state is persisted. Unset = `.gizo` / `.gizo-test`.
    pub state_file: Option<PathBuf>,
    /// Use the test network registry and state file.
    pub test_net: bool,
    /// Registry base URL. Unset = the built-in one for the selected network.
    pub registry_url: Option<String>,
    /// Liveness probe timeout.
    pub health_timeout_ms: u64,
    /// RPC call timeout. 0 = none.
    pub rpc_timeout_ms: u64,
    /// Registry query timeout. 0 = none.
    pub registry_timeout_ms: u64,
    /// Request a new key pair when a dead persisted dispatcher is replaced
    /// through discovery.
    pub rotate_keys_on_failover: bool,
}

impl Default for GizoConfig {
    fn default() -> Self {
        Self {
            dispatcher: None,
            state_file: None,
            test_net: false,
            registry_url: None,
            health_timeout_ms: 500,
            rpc_timeout_ms: 0,
            registry_timeout_ms: 0,
            rotate_keys_on_failover: true,
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("gizo")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl GizoConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_file(&Self::file_path())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load a config file without env overrides. Missing file = defaults.
    pub fn load_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(GizoConfig::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("GIZO_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write the config to `path`, creating parent directories.
    pub fn write(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteFailed(path.to_path_buf(), e))?;
        }
        let text = toml::to_string_pretty(self).map_err(ConfigError::SerializeFailed)?;
        std::fs::write(path, text).map_err(|e| ConfigError::WriteFailed(path.to_path_buf(), e))
    }

    /// Write a default config to `path` unless a file is already there.
    /// Returns whether a file was written.
    pub fn write_default_if_missing(path: &std::path::Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        GizoConfig::default().write(path)?;
        Ok(true)
    }

    /// Apply GIZO_* env var overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("GIZO_DISPATCHER") {
            self.dispatcher = Some(v);
        }
        if let Some(v) = var("GIZO_STATE_FILE") {
            self.state_file = Some(PathBuf::from(v));
        }
        if let Some(v) = var("GIZO_TEST_NET") {
            self.test_net = v == "true" || v == "1";
        }
        if let Some(v) = var("GIZO_REGISTRY_URL") {
            self.registry_url = Some(v);
        }
        if let Some(v) = var("GIZO_HEALTH_TIMEOUT_MS") {
            if let Ok(ms) = v.parse() {
                self.health_timeout_ms = ms;
            }
        }
        if let Some(v) = var("GIZO_RPC_TIMEOUT_MS") {
            if let Ok(ms) = v.parse() {
                self.rpc_timeout_ms = ms;
            }
        }
    }

    // ── Resolved values ───────────────────────────────────────────────────────

    /// Connection state path: explicit path, else `.gizo-test` on the test
    /// network, else `.gizo`.
    pub fn state_path(&self) -> PathBuf {
        match &self.state_file {
            Some(path) => path.clone(),
            None if self.test_net => PathBuf::from(STATE_FILE_TESTNET),
            None => PathBuf::from(STATE_FILE),
        }
    }

    pub fn registry_base(&self) -> &str {
        match &self.registry_url {
            Some(url) => url.trim_end_matches('/'),
            None if self.test_net => CENTRUM_TESTNET,
            None => CENTRUM,
        }
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn rpc_timeout(&self) -> Option<Duration> {
        (self.rpc_timeout_ms > 0).then(|| Duration::from_millis(self.rpc_timeout_ms))
    }

    pub fn registry_timeout(&self) -> Option<Duration> {
        (self.registry_timeout_ms > 0).then(|| Duration::from_millis(self.registry_timeout_ms))
    }
}
