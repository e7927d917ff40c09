use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the planpin engine and sync daemon.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BackendConfig {
    /// Base URL of the backend gateway (if None, runs in capture-only mode)
    pub base_url: Option<String>,

    /// API key sent as bearer token on every gateway call
    pub api_key: Option<String>,

    /// Health endpoint for the connectivity probe
    /// (defaults to `{base_url}/health`)
    pub health_url: Option<String>,
}

impl BackendConfig {
    /// URL the connectivity probe should hit.
    pub fn probe_url(&self) -> Option<String> {
        self.health_url.clone().or_else(|| {
            self.base_url
                .as_ref()
                .map(|base| format!("{}/health", base.trim_end_matches('/')))
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StorageConfig {
    /// Path to the offline queue database
    /// (defaults to `~/.local/share/planpin/queue.db`)
    pub queue_db: Option<PathBuf>,
}

impl StorageConfig {
    pub fn queue_db_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.queue_db {
            return Ok(path.clone());
        }
        let home_dir = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home_dir
            .join(".local")
            .join("share")
            .join("planpin")
            .join("queue.db"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncSettings {
    /// Periodic sync interval in seconds
    #[serde(default = "default_sync_interval")]
    pub interval_seconds: u64,

    /// Connectivity probe interval in seconds
    #[serde(default = "default_probe_interval")]
    pub probe_interval_seconds: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            interval_seconds: default_sync_interval(),
            probe_interval_seconds: default_probe_interval(),
        }
    }
}

fn default_sync_interval() -> u64 {
    30
}

fn default_probe_interval() -> u64 {
    5
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// `PLANPIN_CONFIG` overrides the path; otherwise
    /// `~/.config/planpin/config.toml` is used and created with defaults on
    /// first run.
    pub fn load() -> Result<Self> {
        if let Ok(custom_path) = std::env::var("PLANPIN_CONFIG") {
            return Self::load_from(Path::new(&custom_path));
        }
        let home_dir = dirs::home_dir().context("Could not determine home directory")?;
        let config_dir = home_dir.join(".config").join("planpin");
        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
            let default_config = Self::default();
            let toml_str = toml::to_string_pretty(&default_config)
                .context("Failed to serialize default config")?;
            fs::write(&config_path, toml_str).context("Failed to write default config file")?;
            return Ok(default_config);
        }
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, toml_str)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
