//! Loads and saves the application configuration file.

use std::path::{Path, PathBuf};
use tokio::fs;

use upcrib_core::config::AppConfig;
use upcrib_core::{Result, UpcribError};

use crate::paths::UpcribPaths;

/// Reads `config.toml`, falling back to defaults when the file is missing.
pub struct ConfigService {
    config_path: PathBuf,
}

impl ConfigService {
    pub fn new(config_path: impl AsRef<Path>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// Creates a service for the default platform location
    /// (`~/.config/upcrib/config.toml`).
    pub fn default_location() -> Result<Self> {
        let config_path = UpcribPaths::config_file()
            .map_err(|e| UpcribError::config(format!("Failed to resolve config path: {e}")))?;
        Ok(Self::new(config_path))
    }

    /// Loads the configuration. A missing file is the expected first-run
    /// state and yields defaults; a present-but-invalid file is an error.
    pub async fn load(&self) -> Result<AppConfig> {
        if !fs::try_exists(&self.config_path).await? {
            tracing::debug!(path = ?self.config_path, "no config file, using defaults");
            return Ok(AppConfig::default());
        }

        let raw = fs::read_to_string(&self.config_path).await?;
        let config: AppConfig = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Writes the configuration back, creating parent directories as needed.
    pub async fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let raw = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, raw).await?;
        Ok(())
    }
}
