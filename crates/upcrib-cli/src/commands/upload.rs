use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use upcrib_application::poller::{Poller, PollerState, StopReason, StopWhen};
use upcrib_application::ImageUpload;
use upcrib_core::session::{SessionData, SessionStatus};

use super::utils;

pub async fn run(session_id: &str, image: &Path, analyze: bool) -> Result<()> {
    let config = utils::load_config().await?;
    let api = utils::api_client().await?;

    println!("📤 Uploading {}...", image.display());
    let upload = ImageUpload::new(Arc::clone(&api));
    let result = upload.upload(session_id, image).await?;
    println!("✅ Uploaded: {}", result.image_url);

    if !analyze {
        println!("\n💡 Next step: upcrib upload ... --analyze, or upcrib questions {session_id}");
        return Ok(());
    }

    let analysis = upload.trigger_analysis(session_id).await?;
    println!("🔍 Analysis started (job {})", analysis.job_id);
    println!("   waiting for questions...");

    // Bounded wait: the analysis probe budget is 40 attempts x 5s by default.
    let poller = Poller::new();
    let probe_api = Arc::clone(&api);
    let probe_session = session_id.to_string();
    poller
        .start(
            move || {
                let api = Arc::clone(&probe_api);
                let session_id = probe_session.clone();
                async move { api.get_session_state(&session_id).await }
            },
            config.analysis_poll_interval(),
            StopWhen::result(|s: &SessionData| {
                s.has_questions || s.status == SessionStatus::QuestionsReady
            })
            .max_attempts(config.analysis_poll_max_attempts),
        )
        .await;
    poller.wait().await;

    let snap = poller.snapshot().await;
    match snap.state {
        PollerState::Stopped(StopReason::Satisfied) => {
            println!("✅ Questions are ready");
            println!("\n💡 Next step: upcrib questions {session_id}");
        }
        PollerState::Stopped(StopReason::Exhausted) => {
            println!("⏱️ Analysis did not finish in time; try `upcrib questions {session_id}` later");
        }
        _ => {
            if let Some(error) = snap.error {
                println!("❌ Analysis wait failed: {error}");
            }
        }
    }
    Ok(())
}
