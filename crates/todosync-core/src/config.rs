//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/todosync/config.toml)
//! 3. Environment variables (TODOSYNC_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::{SyncOptions, WritePolicy};
use crate::remote::DEFAULT_TIMEOUT_SECS;

/// Environment variable prefix
const ENV_PREFIX: &str = "TODOSYNC";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the todo REST service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Todos shown per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Show the most recently added todos first
    #[serde(default = "default_true")]
    pub newest_first: bool,

    /// Whether creates and updates are shown before the server confirms
    #[serde(default)]
    pub write_policy: WritePolicy,

    /// Refetch the list after every successful change
    #[serde(default)]
    pub refetch_on_invalidate: bool,

    /// Refetch when the snapshot is older than this many seconds
    #[serde(default)]
    pub max_age_secs: Option<u64>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Write logs here instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            newest_first: true,
            write_policy: WritePolicy::default(),
            refetch_on_invalidate: false,
            max_age_secs: None,
            request_timeout_secs: default_timeout(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (TODOSYNC_BASE_URL, TODOSYNC_PAGE_SIZE, TODOSYNC_WRITE_POLICY)
    /// 2. Config file (~/.config/todosync/config.toml or TODOSYNC_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path from the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // TODOSYNC_BASE_URL
        if let Ok(val) = std::env::var(format!("{}_BASE_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.base_url = val;
            }
        }

        // TODOSYNC_PAGE_SIZE
        if let Ok(val) = std::env::var(format!("{}_PAGE_SIZE", ENV_PREFIX)) {
            self.page_size = val
                .parse()
                .with_context(|| format!("Invalid {}_PAGE_SIZE: {:?}", ENV_PREFIX, val))?;
        }

        // TODOSYNC_WRITE_POLICY
        if let Ok(val) = std::env::var(format!("{}_WRITE_POLICY", ENV_PREFIX)) {
            self.write_policy = val.parse().map_err(anyhow::Error::msg)?;
        }

        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with TODOSYNC_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("todosync")
            .join("config.toml")
    }

    /// HTTP request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Engine options derived from this configuration
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            write_policy: self.write_policy,
            refetch_on_invalidate: self.refetch_on_invalidate,
            max_age: self.max_age_secs.map(Duration::from_secs),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_page_size() -> usize {
    5
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}
