use anyhow::{Context, Result};
use planpin_core::config::Config;
use std::{fs, path::Path};
use tracing::info;

/// Load daemon configuration, creating a default file on first run.
pub fn load_syncd_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let default_config = Config::default();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_str = toml::to_string_pretty(&default_config)
            .context("Failed to serialize default config")?;
        fs::write(path, toml_str)
            .with_context(|| format!("Failed to write default config: {}", path.display()))?;

        info!("created default config at: {}", path.display());
        return Ok(default_config);
    }

    Config::load_from(path)
}
