use anyhow::Result;

use super::utils;

pub async fn create(user_id: Option<&str>) -> Result<()> {
    let api = utils::api_client().await?;
    let session = api.create_session(user_id).await?;

    println!("✅ Session created: {}", session.session_id);
    println!("   status: {:?}", session.status);
    println!("\n💡 Next step: upcrib upload {} <image> --analyze", session.session_id);
    Ok(())
}

pub async fn state(session_id: &str) -> Result<()> {
    let api = utils::api_client().await?;
    let state = api.get_session_state(session_id).await?;

    println!("Session {}", state.session_id);
    println!("  status:        {:?}", state.status);
    println!("  created:       {}", state.created_at);
    println!("  has image:     {}", state.has_image);
    println!("  has questions: {}", state.has_questions);
    if state.total_questions > 0 {
        println!(
            "  answered:      {}/{}",
            state.questions_answered, state.total_questions
        );
    }
    if let Some(image) = &state.generated_image {
        println!("  generated:     {}", image.filename);
    }
    if state.has_pending_jobs {
        for job in state.pending_jobs.as_deref().unwrap_or_default() {
            println!("  pending job:   {} ({:?}, {:?})", job.id, job.job_type, job.status);
        }
    }
    Ok(())
}
