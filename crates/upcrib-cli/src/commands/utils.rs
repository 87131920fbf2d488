use anyhow::Result;
use std::io::Write;
use std::sync::Arc;

use upcrib_api::ApiClient;
use upcrib_core::config::AppConfig;
use upcrib_infrastructure::{ConfigService, HistoryStore, HttpImageFetcher};

pub async fn load_config() -> Result<AppConfig> {
    let service = ConfigService::default_location()?;
    Ok(service.load().await?)
}

pub async fn api_client() -> Result<Arc<ApiClient>> {
    let config = load_config().await?;
    Ok(Arc::new(ApiClient::new(&config)))
}

pub fn history_store() -> Result<Arc<HistoryStore>> {
    Ok(Arc::new(HistoryStore::default_location(Arc::new(
        HttpImageFetcher::new(),
    ))?))
}

/// Asks for confirmation on stdin unless `--yes` was passed.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    print!("{prompt} [y/N]: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
