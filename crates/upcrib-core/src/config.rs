//! Application configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://upcrib-backend.onrender.com";
const DEFAULT_API_PATH: &str = "/api";

/// Client configuration, loaded from `config.toml` with sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend origin, without a trailing slash.
    pub base_url: String,
    /// Path prefix for the JSON API (the health endpoint lives outside it).
    pub api_path: String,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,
    /// Interval between analysis status probes, in seconds.
    pub analysis_poll_interval_secs: u64,
    /// Attempt bound for the analysis wait (40 x 5s by default).
    pub analysis_poll_max_attempts: u32,
    /// Interval between background generation status checks, in seconds.
    pub generation_poll_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            request_timeout_secs: 30,
            analysis_poll_interval_secs: 5,
            analysis_poll_max_attempts: 40,
            generation_poll_interval_secs: 10,
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn analysis_poll_interval(&self) -> Duration {
        Duration::from_secs(self.analysis_poll_interval_secs)
    }

    pub fn generation_poll_interval(&self) -> Duration {
        Duration::from_secs(self.generation_poll_interval_secs)
    }
}
