use anyhow::{bail, Context, Result};
use std::sync::Arc;

use upcrib_application::QuestionFlow;

use super::utils;

pub async fn show(session_id: &str) -> Result<()> {
    let api = utils::api_client().await?;
    let flow = QuestionFlow::new(api);
    let questions = flow.fetch(session_id).await?;

    if questions.is_empty() {
        println!("No questions yet; run the analysis first.");
        return Ok(());
    }

    println!("Questions for session {session_id}:");
    for question in &questions {
        println!("  [{}] {}", question.id, question.prompt);
        if let Some(options) = &question.options {
            println!("      options: {}", options.join(", "));
        }
    }
    println!("\n💡 Answer with: upcrib answer {session_id} <id>=<value> ...");
    Ok(())
}

pub async fn answer(session_id: &str, answers: &[String]) -> Result<()> {
    let api = utils::api_client().await?;
    let flow = QuestionFlow::new(Arc::clone(&api));
    let questions = flow.fetch(session_id).await?;

    for pair in answers {
        let (id, value) = pair
            .split_once('=')
            .with_context(|| format!("Invalid answer '{pair}', expected <question-id>=<value>"))?;
        flow.set_answer(id, value).await;
    }

    if !flow.all_answered().await {
        bail!(
            "Answered {}/{} questions; every question needs a non-blank answer",
            flow.answered_count().await,
            questions.len()
        );
    }

    let result = flow.submit(session_id).await?;
    println!(
        "✅ Submitted {}/{} answers",
        result.answers_submitted, result.total_answers
    );
    if result.all_complete {
        println!("\n💡 Next step: upcrib generate {session_id} --wait");
    }
    Ok(())
}
