//! Stateless HTTP client for the renovation backend.
//!
//! Every operation issues one request, checks the HTTP status and the
//! response envelope, and returns the typed payload. The client holds no
//! state beyond its configuration; all calls are safe for the caller to
//! retry (idempotency by `sessionId` is a server property).

use async_trait::async_trait;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use upcrib_core::config::AppConfig;
use upcrib_core::question::Answer;
use upcrib_core::repository::StatusSource;
use upcrib_core::session::{
    AnswersResult, Entitlements, EntitlementCheck, GenerationResult, HealthCheck, QuestionsResult,
    RenovationStart, RenovationStatus, SessionData, UploadResult,
};
use upcrib_core::{Result, UpcribError};

use crate::envelope::ApiResponse;

/// Typed client over the backend REST API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_path: String,
    timeout: Duration,
}

impl ApiClient {
    /// Creates a client from the application configuration.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_path: config.api_path.clone(),
            timeout: config.request_timeout(),
        }
    }

    /// Creates a client for a base URL with default API path and timeout.
    pub fn from_base_url(base_url: impl Into<String>) -> Self {
        let config = AppConfig {
            base_url: base_url.into(),
            ..AppConfig::default()
        };
        Self::new(&config)
    }

    /// The configured backend origin, used to resolve relative image URLs.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves a server-relative path (e.g. `/uploads/x.jpg`) against the
    /// base URL. Absolute URLs pass through unchanged.
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_path, endpoint)
    }

    /// Sends a request and unwraps the JSON envelope.
    ///
    /// `fallback` is the generic per-operation message used when the server
    /// does not supply one.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        fallback: &str,
    ) -> Result<T> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| UpcribError::transport(format!("{fallback}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpcribError::transport(format!("{fallback}: {e}")))?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                if !status.is_success() {
                    return Err(UpcribError::Api {
                        message: format!("HTTP {}", status.as_u16()),
                        code: Some(status.as_u16().to_string()),
                    });
                }
                return Err(UpcribError::transport(format!(
                    "{fallback}: malformed response: {e}"
                )));
            }
        };

        if !status.is_success() {
            let (message, code) = match envelope.error {
                Some(err) => (
                    err.message,
                    err.code.or_else(|| Some(status.as_u16().to_string())),
                ),
                None => (
                    format!("HTTP {}", status.as_u16()),
                    Some(status.as_u16().to_string()),
                ),
            };
            return Err(UpcribError::Api { message, code });
        }

        envelope.into_data(fallback)
    }

    // ========================================================================
    // Health
    // ========================================================================

    /// Probes the backend health endpoint (served outside the API path, no
    /// envelope).
    pub async fn health_check(&self) -> Result<HealthCheck> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| UpcribError::transport(format!("Health check failed: {e}")))?;
        response
            .json::<HealthCheck>()
            .await
            .map_err(|e| UpcribError::transport(format!("Health check failed: {e}")))
    }

    // ========================================================================
    // Session management
    // ========================================================================

    pub async fn create_session(&self, user_id: Option<&str>) -> Result<SessionData> {
        tracing::debug!(?user_id, "creating session");
        let request = self
            .http
            .post(self.api_url("/session"))
            .json(&serde_json::json!({ "userId": user_id }));
        self.execute(request, "Failed to create session").await
    }

    /// Fetches current server-side truth for a session. This is the only
    /// way session status advances client-side.
    pub async fn get_session_state(&self, session_id: &str) -> Result<SessionData> {
        let request = self
            .http
            .get(self.api_url(&format!("/session/{session_id}/state")));
        self.execute(request, "Failed to get session state").await
    }

    // ========================================================================
    // Image upload and analysis
    // ========================================================================

    /// Uploads a local image and associates it with the session
    /// (multipart: `sessionId` + `image`).
    pub async fn upload_image(&self, session_id: &str, image_path: &Path) -> Result<UploadResult> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| UpcribError::io(format!("Failed to read {image_path:?}: {e}")))?;

        let file_name = image_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("house-image.jpg")
            .to_string();
        let mime = mime_guess::from_path(image_path).first_or(mime_guess::mime::IMAGE_JPEG);

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())
            .map_err(|e| UpcribError::internal(format!("Invalid mime type: {e}")))?;
        let form = multipart::Form::new()
            .text("sessionId", session_id.to_string())
            .part("image", part);

        let request = self.http.post(self.api_url("/upload")).multipart(form);
        self.execute(request, "Upload failed").await
    }

    /// Starts asynchronous AI analysis of the uploaded image.
    pub async fn analyze_image(&self, session_id: &str) -> Result<GenerationResult> {
        let request = self
            .http
            .post(self.api_url("/analyze"))
            .json(&serde_json::json!({ "sessionId": session_id }));
        self.execute(request, "Failed to trigger analysis").await
    }

    // ========================================================================
    // Questions
    // ========================================================================

    pub async fn get_questions(&self, session_id: &str) -> Result<QuestionsResult> {
        let request = self.http.get(self.api_url(&format!("/questions/{session_id}")));
        self.execute(request, "Failed to get questions").await
    }

    /// Submits the full answer set. All-or-nothing per call; idempotent on
    /// the server by `sessionId`.
    pub async fn submit_answers(
        &self,
        session_id: &str,
        answers: &[Answer],
    ) -> Result<AnswersResult> {
        let request = self
            .http
            .post(self.api_url(&format!("/questions/{session_id}/answers")))
            .json(&serde_json::json!({ "answers": answers }));
        self.execute(request, "Failed to submit answers").await
    }

    // ========================================================================
    // Generation
    // ========================================================================

    /// Starts asynchronous image generation; returns a job identifier, not
    /// the image.
    pub async fn generate_renovated_image(&self, session_id: &str) -> Result<GenerationResult> {
        tracing::debug!(session_id, "starting generation");
        let request = self
            .http
            .post(self.api_url("/generate"))
            .json(&serde_json::json!({ "sessionId": session_id }));
        self.execute(request, "Failed to start generation").await
    }

    /// Kicks off a style renovation reusing the session's uploaded image
    /// (multipart: `sessionId` + optional style fields).
    pub async fn create_renovation_from_session(
        &self,
        session_id: &str,
        architectural_style: Option<&str>,
        color_palette: Option<&str>,
    ) -> Result<RenovationStart> {
        let mut form = multipart::Form::new().text("sessionId", session_id.to_string());
        if let Some(style) = architectural_style {
            form = form.text("architecturalStyle", style.to_string());
        }
        if let Some(palette) = color_palette {
            form = form.text("colorPalette", palette.to_string());
        }

        let request = self
            .http
            .post(self.api_url("/enhanced-style-renovation"))
            .multipart(form);
        self.execute(request, "Style renovation failed").await
    }

    /// Fetches renovation job status — the polling probe.
    pub async fn renovation_status(&self, session_id: &str) -> Result<RenovationStatus> {
        let request = self.http.get(self.api_url(&format!(
            "/enhanced-style-renovation/{session_id}/status"
        )));
        self.execute(request, "Failed to get status").await
    }

    /// Downloads generated image bytes from the static file path.
    pub async fn download_generated_image(&self, filename: &str) -> Result<Vec<u8>> {
        let url = format!("{}/generated/{filename}", self.base_url);
        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| UpcribError::transport(format!("Failed to download image: {e}")))?;

        if !response.status().is_success() {
            return Err(UpcribError::transport(format!(
                "Failed to download image: HTTP {}",
                response.status().as_u16()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpcribError::transport(format!("Failed to download image: {e}")))?;
        Ok(bytes.to_vec())
    }

    // ========================================================================
    // Entitlements
    // ========================================================================

    pub async fn get_user_entitlements(&self, user_id: &str) -> Result<Entitlements> {
        let request = self
            .http
            .get(self.api_url(&format!("/entitlements/{user_id}")));
        self.execute(request, "Failed to get entitlements").await
    }

    pub async fn check_entitlement(
        &self,
        user_id: &str,
        entitlement_type: &str,
        quantity: u32,
    ) -> Result<EntitlementCheck> {
        let request = self
            .http
            .post(self.api_url(&format!("/entitlements/{user_id}/check")))
            .json(&serde_json::json!({
                "entitlementType": entitlement_type,
                "quantity": quantity,
            }));
        self.execute(request, "Failed to check entitlement").await
    }
}

#[async_trait]
impl StatusSource for ApiClient {
    async fn renovation_status(&self, session_id: &str) -> Result<RenovationStatus> {
        ApiClient::renovation_status(self, session_id).await
    }
}

/// Whether an error is an HTTP 429 rejection.
fn is_rate_limited(err: &UpcribError) -> bool {
    match err {
        UpcribError::Api { message, code } => {
            code.as_deref() == Some("429") || message.contains("429")
        }
        _ => false,
    }
}

/// Opt-in retry wrapper for rate-limited calls: exponential backoff with a
/// 1 second base delay, doubling per attempt, capped at `max_attempts`.
/// Non-429 errors propagate immediately.
pub async fn with_rate_limit_retry<T, F, Fut>(mut call: F, max_attempts: u32) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if is_rate_limited(&err) && attempt + 1 < max_attempts => {
                let delay = Duration::from_secs(1u64 << attempt);
                tracing::warn!(attempt, ?delay, "rate limited, backing off");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_url_prefixes_relative_paths() {
        let client = ApiClient::from_base_url("https://backend.example.com");
        assert_eq!(
            client.absolute_url("/generated/out.jpg"),
            "https://backend.example.com/generated/out.jpg"
        );
        assert_eq!(
            client.absolute_url("uploads/in.jpg"),
            "https://backend.example.com/uploads/in.jpg"
        );
    }

    #[test]
    fn test_absolute_url_passes_through_absolute() {
        let client = ApiClient::from_base_url("https://backend.example.com");
        assert_eq!(
            client.absolute_url("https://cdn.example.com/x.jpg"),
            "https://cdn.example.com/x.jpg"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::from_base_url("http://localhost:3001/");
        assert_eq!(client.base_url(), "http://localhost:3001");
    }

    #[test]
    fn test_is_rate_limited() {
        assert!(is_rate_limited(&UpcribError::Api {
            message: "Too Many Requests".to_string(),
            code: Some("429".to_string()),
        }));
        assert!(is_rate_limited(&UpcribError::Api {
            message: "HTTP 429".to_string(),
            code: None,
        }));
        assert!(!is_rate_limited(&UpcribError::transport("timeout")));
    }
}
