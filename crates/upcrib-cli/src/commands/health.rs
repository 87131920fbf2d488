use anyhow::Result;

use super::utils;

pub async fn run() -> Result<()> {
    let api = utils::api_client().await?;
    match api.health_check().await {
        Ok(health) => {
            println!("✅ Backend is {} ({})", health.status, health.timestamp);
            if let Some(version) = health.version {
                println!("   version: {version}");
            }
        }
        Err(err) => {
            println!("❌ Backend unreachable: {}", err.user_message());
            std::process::exit(1);
        }
    }
    Ok(())
}
