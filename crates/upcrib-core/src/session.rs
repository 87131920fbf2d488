//! Wire types for the renovation backend API.
//!
//! Field names are serialized in camelCase to match the backend's JSON
//! envelope exactly; the session status enum uses the backend's snake_case
//! string values.

use serde::{Deserialize, Serialize};

use crate::question::Question;

/// Server-authoritative session lifecycle status.
///
/// `Timeout` is a local-only pseudo-state: the backend never sends it. It is
/// assigned by polling callers when a bounded wait expires, and is the one
/// status the client is allowed to set itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    Uploading,
    Uploaded,
    Analyzing,
    QuestionsReady,
    AnswersComplete,
    Generating,
    Completed,
    Failed,
    Timeout,
}

impl SessionStatus {
    /// Whether this status is terminal for a generation wait.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Timeout)
    }
}

/// Metadata for an uploaded source image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub filename: String,
    pub mimetype: Option<String>,
    pub size: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub uploaded_at: Option<String>,
    /// Relative URL path (e.g. `/uploads/filename.jpg`); prefix with the
    /// configured base URL before fetching.
    pub url: Option<String>,
}

/// Metadata for a generated result image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub path: Option<String>,
    pub filename: String,
    pub extension: Option<String>,
    pub generated_at: Option<String>,
    /// Relative URL path (e.g. `/generated/filename.jpg`).
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Analyze,
    Generate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// An asynchronous backend job attached to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub status: JobStatus,
    pub created_at: Option<String>,
}

/// One renovation request lifecycle, as reported by the server.
///
/// The client never mutates `status` locally (except assigning the
/// [`SessionStatus::Timeout`] pseudo-state); it advances only by re-fetching
/// this record from the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub session_id: String,
    pub status: SessionStatus,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub has_image: bool,
    #[serde(default)]
    pub has_questions: bool,
    #[serde(default)]
    pub questions_answered: u32,
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub has_pending_jobs: bool,
    #[serde(default)]
    pub image: Option<ImageMetadata>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub generated_image: Option<GeneratedImage>,
    #[serde(default)]
    pub questions: Option<Vec<Question>>,
    #[serde(default)]
    pub pending_jobs: Option<Vec<Job>>,
}

/// Style parameters attached to a renovation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleData {
    pub architectural_style: String,
    pub color_palette: String,
    #[serde(default)]
    pub custom_colors: Option<Vec<String>>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub reference_image_path: Option<String>,
    #[serde(default)]
    pub reference_image_original_name: Option<String>,
}

/// Response shape of the renovation status endpoint — the polling probe's
/// result type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenovationStatus {
    pub session_id: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub has_pending_jobs: bool,
    #[serde(default)]
    pub style_data: Option<StyleData>,
    #[serde(default)]
    pub original_image: Option<ImageMetadata>,
    #[serde(default)]
    pub generated_image: Option<GeneratedImage>,
}

impl RenovationStatus {
    /// Whether generation finished successfully with a result image present.
    ///
    /// `status == completed` without an image is treated as still pending:
    /// the backend marks completion slightly before the image record lands.
    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Completed && self.generated_image.is_some()
    }

    pub fn is_failed(&self) -> bool {
        self.status == SessionStatus::Failed
    }
}

/// Result of a successful image upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub session_id: String,
    pub image_url: String,
    pub metadata: Option<ImageMetadata>,
}

/// Result of fetching the generated question set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionsResult {
    pub session_id: String,
    pub questions: Vec<Question>,
    pub total_questions: u32,
}

/// Result of submitting answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswersResult {
    pub session_id: String,
    pub answers_submitted: u32,
    pub total_answers: u32,
    #[serde(default)]
    pub all_complete: bool,
}

/// Acknowledgement of an asynchronous analyze/generate request. Returns a
/// job identifier, not the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub job_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Acknowledgement of a style-renovation kickoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenovationStart {
    pub session_id: String,
    pub job_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub house_image_url: Option<String>,
    #[serde(default)]
    pub reference_image_url: Option<String>,
}

/// Backend health probe response (served outside the `/api` path).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub success: bool,
    pub status: String,
    pub timestamp: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Per-user usage entitlements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlements {
    pub user_id: String,
    #[serde(default)]
    pub has_available_uploads: bool,
    #[serde(default)]
    pub has_available_analyses: bool,
    #[serde(default)]
    pub has_available_questions: bool,
}

/// Result of a single entitlement check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementCheck {
    pub has_entitlement: bool,
    pub current_usage: u32,
    pub limit: u32,
    pub remaining: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_uses_snake_case() {
        let json = serde_json::to_string(&SessionStatus::QuestionsReady).unwrap();
        assert_eq!(json, "\"questions_ready\"");
        let back: SessionStatus = serde_json::from_str("\"answers_complete\"").unwrap();
        assert_eq!(back, SessionStatus::AnswersComplete);
    }

    #[test]
    fn test_session_data_accepts_minimal_payload() {
        let json = r#"{
            "sessionId": "abc-123",
            "status": "created",
            "createdAt": "2025-01-01T00:00:00Z"
        }"#;
        let session: SessionData = serde_json::from_str(json).unwrap();
        assert_eq!(session.session_id, "abc-123");
        assert_eq!(session.status, SessionStatus::Created);
        assert!(!session.has_image);
        assert!(session.generated_image.is_none());
    }

    #[test]
    fn test_renovation_status_complete_requires_image() {
        let without_image = RenovationStatus {
            session_id: "s1".to_string(),
            status: SessionStatus::Completed,
            has_pending_jobs: false,
            style_data: None,
            original_image: None,
            generated_image: None,
        };
        assert!(!without_image.is_complete());

        let with_image = RenovationStatus {
            generated_image: Some(GeneratedImage {
                path: None,
                filename: "out.jpg".to_string(),
                extension: Some("jpg".to_string()),
                generated_at: None,
                url: Some("/generated/out.jpg".to_string()),
            }),
            ..without_image
        };
        assert!(with_image.is_complete());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
        assert!(SessionStatus::Timeout.is_terminal());
        assert!(!SessionStatus::Generating.is_terminal());
    }
}
