use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant};

use upcrib_application::BackgroundPollingService;
use upcrib_core::history::{DesignHistoryItem, DesignStatus};
use upcrib_core::repository::{Notifier, StatusSource, TrackingStore};
use upcrib_infrastructure::{FileTrackingStore, TracingNotifier};

use super::utils;

pub async fn run(session_id: &str, wait: bool, timeout_secs: u64) -> Result<()> {
    let config = utils::load_config().await?;
    let api = utils::api_client().await?;
    let history = utils::history_store()?;

    let result = api.generate_renovated_image(session_id).await?;
    println!("🎨 Generation started (job {})", result.job_id);

    // Record the in-progress design right away so it shows up in history
    // even if we exit before completion.
    match api.get_session_state(session_id).await {
        Ok(state) => {
            let thumbnail = state
                .image_url
                .or_else(|| state.image.and_then(|m| m.url))
                .map(|url| api.absolute_url(&url))
                .unwrap_or_default();
            if let Err(err) = history
                .save(DesignHistoryItem::generating(session_id, thumbnail))
                .await
            {
                tracing::warn!(error = %err, "failed to record in-progress design");
            }
        }
        Err(err) => tracing::warn!(error = %err, "failed to fetch session state"),
    }

    let notifier = Arc::new(TracingNotifier::new());
    let store = Arc::new(FileTrackingStore::default_location()?);
    let service = Arc::new(BackgroundPollingService::new(
        Arc::clone(&api) as Arc<dyn StatusSource>,
        notifier as Arc<dyn Notifier>,
        Arc::clone(&history),
        store as Arc<dyn TrackingStore>,
        &config,
    ));
    service.initialize().await;
    service.add_session(session_id).await;

    if !wait {
        println!("   tracked for background polling; check later with: upcrib history show {session_id}");
        return Ok(());
    }

    println!("   waiting up to {timeout_secs}s...");
    let deadline = Instant::now() + Duration::from_secs(timeout_secs);
    while service.is_tracking(session_id).await {
        if Instant::now() >= deadline {
            service.stop_all().await;
            println!("⏱️ Timed out after {timeout_secs}s; the job stays tracked for the next run");
            return Ok(());
        }
        time::sleep(Duration::from_secs(1)).await;
    }

    match history.get(session_id).await? {
        Some(item) if item.status == DesignStatus::Completed => {
            println!("✅ Design ready: {}", item.title);
            println!("   image: {}", item.thumbnail);
            if let Some(local) = item.local_thumbnail_path {
                println!("   cached: {local}");
            }
        }
        Some(item) if item.status == DesignStatus::Failed => {
            println!("❌ Generation failed; try again with: upcrib generate {session_id}");
        }
        _ => println!("Generation ended without a history record"),
    }
    Ok(())
}
