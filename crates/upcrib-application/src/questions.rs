//! Question-answering workflow handle.

use std::sync::Arc;

use tokio::sync::RwLock;

use upcrib_api::ApiClient;
use upcrib_core::question::{AnswerSheet, Question};
use upcrib_core::session::AnswersResult;
use upcrib_core::{Result, UpcribError};

use crate::state::OpState;

/// Fetches the AI-generated style questions for a session and accumulates
/// answers until every question is answered and the set is submitted.
pub struct QuestionFlow {
    api: Arc<ApiClient>,
    questions: RwLock<OpState<Vec<Question>>>,
    answers: RwLock<AnswerSheet>,
}

impl QuestionFlow {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            questions: RwLock::new(OpState::default()),
            answers: RwLock::new(AnswerSheet::new()),
        }
    }

    pub async fn snapshot(&self) -> OpState<Vec<Question>> {
        self.questions.read().await.clone()
    }

    pub async fn questions(&self) -> Vec<Question> {
        self.questions
            .read()
            .await
            .data
            .clone()
            .unwrap_or_default()
    }

    /// Fetches the question set for a session. Resets previously accumulated
    /// answers: answers belong to one question set.
    pub async fn fetch(&self, session_id: &str) -> Result<Vec<Question>> {
        self.questions.write().await.begin();
        match self.api.get_questions(session_id).await {
            Ok(result) => {
                self.questions
                    .write()
                    .await
                    .succeed(result.questions.clone());
                self.answers.write().await.clear();
                Ok(result.questions)
            }
            Err(err) => {
                self.questions.write().await.fail(err.user_message());
                Err(err)
            }
        }
    }

    /// Records (or clears, when blank) the answer for one question.
    pub async fn set_answer(&self, question_id: &str, value: &str) {
        self.answers.write().await.set_answer(question_id, value);
    }

    pub async fn answer_for(&self, question_id: &str) -> Option<String> {
        self.answers
            .read()
            .await
            .answer_for(question_id)
            .map(str::to_string)
    }

    pub async fn answered_count(&self) -> usize {
        self.answers.read().await.answered_count()
    }

    /// True once questions exist and every one has a non-blank answer.
    pub async fn all_answered(&self) -> bool {
        let questions = self.questions.read().await;
        let Some(questions) = questions.data.as_deref() else {
            return false;
        };
        self.answers.read().await.all_answered(questions)
    }

    /// Submits the accumulated answers. All-or-nothing: refuses to submit a
    /// partial set.
    pub async fn submit(&self, session_id: &str) -> Result<AnswersResult> {
        if !self.all_answered().await {
            return Err(UpcribError::internal(
                "Cannot submit answers before every question is answered",
            ));
        }
        let answers = self.answers.read().await.to_answers();
        match self.api.submit_answers(session_id, &answers).await {
            Ok(result) => Ok(result),
            Err(err) => {
                self.questions.write().await.fail(err.user_message());
                Err(err)
            }
        }
    }

    pub async fn reset(&self) {
        *self.questions.write().await = OpState::default();
        self.answers.write().await.clear();
    }
}
