//! Unified path management for upCrib local state.
//!
//! All persisted client state lives under the platform config and data
//! directories:
//!
//! ```text
//! ~/.config/upcrib/            # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/upcrib/       # Data directory
//! ├── design_history.json      # Design history list
//! ├── polling_sessions.json    # Tracked generation jobs
//! └── design_images/           # Locally cached thumbnails/originals
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for upCrib.
pub struct UpcribPaths;

impl UpcribPaths {
    /// Returns the upCrib configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("upcrib"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the upCrib data directory (history, tracking, cached images).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join("upcrib"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the design history file.
    pub fn history_file() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("design_history.json"))
    }

    /// Returns the path to the tracked polling-session file.
    pub fn tracking_file() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("polling_sessions.json"))
    }

    /// Returns the path to the cached images directory.
    pub fn images_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("design_images"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        let config_dir = UpcribPaths::config_dir().unwrap();
        assert!(config_dir.ends_with("upcrib"));
    }

    #[test]
    fn test_config_file() {
        let config_file = UpcribPaths::config_file().unwrap();
        assert!(config_file.ends_with("config.toml"));
        let config_dir = UpcribPaths::config_dir().unwrap();
        assert!(config_file.starts_with(&config_dir));
    }

    #[test]
    fn test_data_paths_are_under_data_dir() {
        let data_dir = UpcribPaths::data_dir().unwrap();
        assert!(UpcribPaths::history_file().unwrap().starts_with(&data_dir));
        assert!(UpcribPaths::tracking_file().unwrap().starts_with(&data_dir));
        assert!(UpcribPaths::images_dir().unwrap().starts_with(&data_dir));
    }
}
