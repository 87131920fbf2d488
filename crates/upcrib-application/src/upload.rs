//! Image upload workflow handle.
//!
//! Upload progress is simulated: the backend gives no transfer feedback, so
//! a ticker advances progress toward 90% while the request is in flight,
//! jumps to 100% on success, and resets to 0 shortly after.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time;
use tokio_util::sync::CancellationToken;

use upcrib_api::ApiClient;
use upcrib_core::session::{GenerationResult, UploadResult};
use upcrib_core::Result;

const PROGRESS_TICK: Duration = Duration::from_millis(200);
const PROGRESS_STEP: u8 = 10;
const PROGRESS_CEILING: u8 = 90;
const PROGRESS_RESET_DELAY: Duration = Duration::from_secs(2);

/// Observable upload state.
#[derive(Debug, Clone, Default)]
pub struct UploadState {
    pub uploading: bool,
    pub progress: u8,
    pub error: Option<String>,
    pub result: Option<UploadResult>,
}

/// Uploads a house image into a session and exposes simulated progress.
pub struct ImageUpload {
    api: Arc<ApiClient>,
    state: Arc<RwLock<UploadState>>,
    // Stale ticker/reset tasks from a previous upload bail out when the
    // generation no longer matches.
    generation: Arc<AtomicU64>,
    tick: Duration,
    reset_delay: Duration,
}

impl ImageUpload {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self::with_timings(api, PROGRESS_TICK, PROGRESS_RESET_DELAY)
    }

    pub fn with_timings(api: Arc<ApiClient>, tick: Duration, reset_delay: Duration) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(UploadState::default())),
            generation: Arc::new(AtomicU64::new(0)),
            tick,
            reset_delay,
        }
    }

    pub async fn snapshot(&self) -> UploadState {
        self.state.read().await.clone()
    }

    /// Uploads `image_path` into the session.
    pub async fn upload(&self, session_id: &str, image_path: &Path) -> Result<UploadResult> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write().await;
            *state = UploadState {
                uploading: true,
                ..UploadState::default()
            };
        }

        let ticker_token = CancellationToken::new();
        let ticker = {
            let state = Arc::clone(&self.state);
            let token = ticker_token.clone();
            let tick = self.tick;
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = time::sleep(tick) => {}
                    }
                    let mut state = state.write().await;
                    if state.progress < PROGRESS_CEILING {
                        state.progress =
                            (state.progress + PROGRESS_STEP).min(PROGRESS_CEILING);
                    }
                }
            })
        };

        let outcome = self.api.upload_image(session_id, image_path).await;
        ticker_token.cancel();
        let _ = ticker.await;

        match outcome {
            Ok(result) => {
                {
                    let mut state = self.state.write().await;
                    state.uploading = false;
                    state.progress = 100;
                    state.result = Some(result.clone());
                }
                self.schedule_progress_reset(generation);
                Ok(result)
            }
            Err(err) => {
                let mut state = self.state.write().await;
                state.uploading = false;
                state.progress = 0;
                state.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    fn schedule_progress_reset(&self, generation: u64) {
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let delay = self.reset_delay;
        tokio::spawn(async move {
            time::sleep(delay).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }
            state.write().await.progress = 0;
        });
    }

    /// Starts asynchronous AI analysis of the uploaded image.
    pub async fn trigger_analysis(&self, session_id: &str) -> Result<GenerationResult> {
        self.api.analyze_image(session_id).await
    }

    pub async fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.state.write().await = UploadState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn write_image(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("house.jpg");
        std::fs::write(&path, b"\xff\xd8\xff\xe0 not a real jpeg").unwrap();
        path
    }

    fn success_body() -> serde_json::Value {
        json!({
            "success": true,
            "data": {
                "sessionId": "s1",
                "imageUrl": "/uploads/house.jpg",
                "metadata": { "filename": "house.jpg" }
            }
        })
    }

    #[tokio::test]
    async fn test_progress_reaches_100_then_resets() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_body())
                    .set_delay(Duration::from_millis(120)),
            )
            .mount(&server)
            .await;

        let temp_dir = tempfile::TempDir::new().unwrap();
        let image = write_image(&temp_dir);

        let upload = ImageUpload::with_timings(
            Arc::new(ApiClient::from_base_url(server.uri())),
            Duration::from_millis(20),
            Duration::from_millis(100),
        );

        let result = upload.upload("s1", &image).await.unwrap();
        assert_eq!(result.session_id, "s1");

        let snap = upload.snapshot().await;
        assert!(!snap.uploading);
        assert_eq!(snap.progress, 100);
        assert!(snap.result.is_some());

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(upload.snapshot().await.progress, 0);
        // The result survives the progress reset.
        assert!(upload.snapshot().await.result.is_some());
    }

    #[tokio::test]
    async fn test_progress_is_capped_while_in_flight() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_body())
                    .set_delay(Duration::from_millis(400)),
            )
            .mount(&server)
            .await;

        let temp_dir = tempfile::TempDir::new().unwrap();
        let image = write_image(&temp_dir);

        let upload = Arc::new(ImageUpload::with_timings(
            Arc::new(ApiClient::from_base_url(server.uri())),
            Duration::from_millis(10),
            Duration::from_secs(10),
        ));

        let task = {
            let upload = Arc::clone(&upload);
            let image = image.clone();
            tokio::spawn(async move { upload.upload("s1", &image).await })
        };

        // Plenty of ticks fit in the request delay; progress must stop at 90.
        time::sleep(Duration::from_millis(300)).await;
        let snap = upload.snapshot().await;
        assert!(snap.uploading);
        assert_eq!(snap.progress, 90);

        task.await.unwrap().unwrap();
        assert_eq!(upload.snapshot().await.progress, 100);
    }

    #[tokio::test]
    async fn test_failed_upload_records_error_and_zero_progress() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(413).set_body_json(json!({
                "success": false,
                "error": { "message": "Image too large" }
            })))
            .mount(&server)
            .await;

        let temp_dir = tempfile::TempDir::new().unwrap();
        let image = write_image(&temp_dir);

        let upload = ImageUpload::new(Arc::new(ApiClient::from_base_url(server.uri())));
        assert!(upload.upload("s1", &image).await.is_err());

        let snap = upload.snapshot().await;
        assert!(!snap.uploading);
        assert_eq!(snap.progress, 0);
        assert_eq!(snap.error.as_deref(), Some("Image too large"));
        assert!(snap.result.is_none());
    }

    #[tokio::test]
    async fn test_missing_file_fails_without_request() {
        let upload = ImageUpload::new(Arc::new(ApiClient::from_base_url(
            "http://127.0.0.1:1",
        )));
        let err = upload
            .upload("s1", Path::new("/nonexistent/house.jpg"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("house.jpg"));
    }

    #[tokio::test]
    async fn test_reset_clears_state() {
        let upload = ImageUpload::new(Arc::new(ApiClient::from_base_url(
            "http://127.0.0.1:1",
        )));
        let _ = upload.upload("s1", Path::new("/nonexistent.jpg")).await;
        upload.reset().await;

        let snap = upload.snapshot().await;
        assert_eq!(snap.progress, 0);
        assert!(snap.error.is_none());
        assert!(!snap.uploading);
    }
}
