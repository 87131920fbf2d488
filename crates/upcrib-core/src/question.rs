//! Style questions and client-side answer accumulation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Essay,
    FillBlank,
}

/// One AI-generated style question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub prompt: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub index: u32,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub answered: bool,
}

/// One submitted answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    pub value: String,
}

/// Client-side answer accumulator.
///
/// Answers collect in a map keyed by question id (insertion order is
/// irrelevant) until submission. Setting an answer for the same question
/// twice replaces the previous value. A blank-after-trim value clears the
/// answer instead of recording it, so whitespace never counts as answered.
#[derive(Debug, Clone, Default)]
pub struct AnswerSheet {
    answers: HashMap<String, String>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records (or clears, when blank) the answer for a question.
    pub fn set_answer(&mut self, question_id: impl Into<String>, value: impl Into<String>) {
        let question_id = question_id.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.answers.remove(&question_id);
        } else {
            self.answers.insert(question_id, value);
        }
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Whether every question in `questions` has an answer.
    ///
    /// False for an empty question list: "all answered" only means something
    /// once questions exist.
    pub fn all_answered(&self, questions: &[Question]) -> bool {
        !questions.is_empty() && questions.iter().all(|q| self.answers.contains_key(&q.id))
    }

    /// Drains the sheet into the submission payload.
    pub fn to_answers(&self) -> Vec<Answer> {
        self.answers
            .iter()
            .map(|(question_id, value)| Answer {
                question_id: question_id.clone(),
                value: value.clone(),
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, index: u32) -> Question {
        Question {
            id: id.to_string(),
            prompt: format!("Question {}", index),
            question_type: QuestionType::MultipleChoice,
            index,
            options: Some(vec!["Modern".to_string(), "Rustic".to_string()]),
            answered: false,
        }
    }

    #[test]
    fn test_all_answered_false_for_no_questions() {
        let sheet = AnswerSheet::new();
        assert!(!sheet.all_answered(&[]));
    }

    #[test]
    fn test_all_answered_requires_every_question() {
        let questions = vec![question("q1", 0), question("q2", 1), question("q3", 2)];
        let mut sheet = AnswerSheet::new();
        sheet.set_answer("q1", "Modern");
        sheet.set_answer("q2", "Rustic");
        assert!(!sheet.all_answered(&questions));

        sheet.set_answer("q3", "Modern");
        assert!(sheet.all_answered(&questions));
    }

    #[test]
    fn test_blank_answer_does_not_count() {
        let questions = vec![question("q1", 0)];
        let mut sheet = AnswerSheet::new();
        sheet.set_answer("q1", "   ");
        assert!(!sheet.all_answered(&questions));
        assert_eq!(sheet.answered_count(), 0);

        // A blank value also clears a previous answer
        sheet.set_answer("q1", "Modern");
        assert!(sheet.all_answered(&questions));
        sheet.set_answer("q1", "");
        assert!(!sheet.all_answered(&questions));
    }

    #[test]
    fn test_set_answer_replaces() {
        let mut sheet = AnswerSheet::new();
        sheet.set_answer("q1", "Modern");
        sheet.set_answer("q1", "Rustic");
        assert_eq!(sheet.answered_count(), 1);
        assert_eq!(sheet.answer_for("q1"), Some("Rustic"));
    }

    #[test]
    fn test_to_answers_contains_all_entries() {
        let mut sheet = AnswerSheet::new();
        sheet.set_answer("q1", "a");
        sheet.set_answer("q2", "b");
        let mut answers = sheet.to_answers();
        answers.sort_by(|a, b| a.question_id.cmp(&b.question_id));
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].question_id, "q1");
        assert_eq!(answers[1].value, "b");
    }
}
