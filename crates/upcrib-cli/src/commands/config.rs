use anyhow::Result;

use upcrib_infrastructure::ConfigService;

use super::utils;

pub async fn show() -> Result<()> {
    let config = utils::load_config().await?;
    println!("base_url = {}", config.base_url);
    println!("api_path = {}", config.api_path);
    println!("request_timeout_secs = {}", config.request_timeout_secs);
    println!(
        "analysis_poll_interval_secs = {}",
        config.analysis_poll_interval_secs
    );
    println!(
        "analysis_poll_max_attempts = {}",
        config.analysis_poll_max_attempts
    );
    println!(
        "generation_poll_interval_secs = {}",
        config.generation_poll_interval_secs
    );
    Ok(())
}

pub async fn set_url(url: &str) -> Result<()> {
    let service = ConfigService::default_location()?;
    let mut config = service.load().await?;
    config.base_url = url.trim_end_matches('/').to_string();
    service.save(&config).await?;
    println!("✅ base_url set to {}", config.base_url);
    Ok(())
}
