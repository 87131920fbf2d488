//! End-to-end renovation workflow against a mock backend.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use upcrib_api::ApiClient;
use upcrib_application::poller::{Poller, PollerState, StopReason, StopWhen};
use upcrib_application::{BackgroundPollingService, ImageUpload, QuestionFlow, SessionHandle};
use upcrib_core::config::AppConfig;
use upcrib_core::history::DesignStatus;
use upcrib_core::repository::{Notifier, StatusSource, TrackingStore};
use upcrib_core::session::{SessionData, SessionStatus};
use upcrib_infrastructure::{
    HistoryStore, HttpImageFetcher, MemoryTrackingStore, TracingNotifier,
};

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

async fn mock_backend() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/session"))
        .respond_with(ok(json!({
            "sessionId": "sess-1",
            "status": "created",
            "createdAt": "2025-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ok(json!({
            "sessionId": "sess-1",
            "imageUrl": "/uploads/house.jpg",
            "metadata": { "filename": "house.jpg" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ok(json!({ "jobId": "job-analyze-1" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/session/sess-1/state"))
        .respond_with(ok(json!({
            "sessionId": "sess-1",
            "status": "questions_ready",
            "createdAt": "2025-01-01T00:00:00Z",
            "hasImage": true,
            "hasQuestions": true,
            "totalQuestions": 2
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/questions/sess-1"))
        .respond_with(ok(json!({
            "sessionId": "sess-1",
            "totalQuestions": 2,
            "questions": [
                {
                    "id": "q1",
                    "prompt": "Preferred style?",
                    "type": "multiple_choice",
                    "index": 0,
                    "options": ["Modern", "Scandinavian"]
                },
                {
                    "id": "q2",
                    "prompt": "Preferred palette?",
                    "type": "multiple_choice",
                    "index": 1,
                    "options": ["Warm", "Cool"]
                }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/questions/sess-1/answers"))
        .respond_with(ok(json!({
            "sessionId": "sess-1",
            "answersSubmitted": 2,
            "totalAnswers": 2,
            "allComplete": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ok(json!({ "jobId": "job-generate-1" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/enhanced-style-renovation/sess-1/status"))
        .respond_with(ok(json!({
            "sessionId": "sess-1",
            "status": "completed",
            "hasPendingJobs": false,
            "styleData": { "architecturalStyle": "modern", "colorPalette": "warm" },
            "generatedImage": {
                "filename": "out.jpg",
                "url": "/generated/out.jpg"
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/generated/out.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn test_full_renovation_workflow() {
    let server = mock_backend().await;
    let config = AppConfig {
        base_url: server.uri(),
        generation_poll_interval_secs: 1,
        ..AppConfig::default()
    };
    let api = Arc::new(ApiClient::new(&config));

    // Create a session and upload the house photo.
    let session = SessionHandle::new(Arc::clone(&api));
    let created = session.create(Some("user-1")).await.unwrap();
    assert_eq!(created.status, SessionStatus::Created);

    let temp_dir = tempfile::TempDir::new().unwrap();
    let image_path = temp_dir.path().join("house.jpg");
    std::fs::write(&image_path, b"\xff\xd8\xff\xe0 fake jpeg").unwrap();

    let upload = ImageUpload::new(Arc::clone(&api));
    let uploaded = upload.upload("sess-1", &image_path).await.unwrap();
    assert_eq!(uploaded.image_url, "/uploads/house.jpg");
    assert_eq!(upload.snapshot().await.progress, 100);

    // Kick off analysis and poll session state until questions are ready.
    let analysis = upload.trigger_analysis("sess-1").await.unwrap();
    assert_eq!(analysis.job_id, "job-analyze-1");

    let poller = Poller::new();
    let probe_api = Arc::clone(&api);
    poller
        .start(
            move || {
                let api = Arc::clone(&probe_api);
                async move { api.get_session_state("sess-1").await }
            },
            config.analysis_poll_interval(),
            StopWhen::result(|s: &SessionData| s.status == SessionStatus::QuestionsReady)
                .max_attempts(config.analysis_poll_max_attempts),
        )
        .await;
    poller.wait().await;
    let snap = poller.snapshot().await;
    assert_eq!(snap.state, PollerState::Stopped(StopReason::Satisfied));

    // Answer every question and submit.
    let questions = QuestionFlow::new(Arc::clone(&api));
    let fetched = questions.fetch("sess-1").await.unwrap();
    assert_eq!(fetched.len(), 2);
    questions.set_answer("q1", "Modern").await;
    questions.set_answer("q2", "Warm").await;
    let submitted = questions.submit("sess-1").await.unwrap();
    assert!(submitted.all_complete);

    // Start generation and let the background service track it to the end.
    let generation = api.generate_renovated_image("sess-1").await.unwrap();
    assert_eq!(generation.job_id, "job-generate-1");

    let history = Arc::new(HistoryStore::new(
        temp_dir.path().join("data"),
        Arc::new(HttpImageFetcher::new()),
    ));
    let notifier = Arc::new(TracingNotifier::new());
    let service = Arc::new(BackgroundPollingService::new(
        Arc::clone(&api) as Arc<dyn StatusSource>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        Arc::clone(&history),
        Arc::new(MemoryTrackingStore::new()) as Arc<dyn TrackingStore>,
        &config,
    ));
    service.initialize().await;
    service.add_session("sess-1").await;

    for _ in 0..100 {
        if !service.is_tracking("sess-1").await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(!service.is_tracking("sess-1").await);

    let item = history.get("sess-1").await.unwrap().unwrap();
    assert_eq!(item.status, DesignStatus::Completed);
    assert!(item.thumbnail.ends_with("/generated/out.jpg"));
    assert_eq!(
        item.style_data.as_ref().unwrap().architectural_style,
        "modern"
    );

    // The generated image got cached locally through the mock backend.
    let cached = item.local_thumbnail_path.unwrap();
    assert_eq!(std::fs::read(&cached).unwrap(), b"jpeg-bytes");

    // Terminal notification replaced the in-progress one.
    assert_eq!(notifier.active_ids().await, vec!["complete-sess-1"]);
}

#[tokio::test]
async fn test_generation_wait_times_out_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/session"))
        .respond_with(ok(json!({
            "sessionId": "sess-2",
            "status": "generating",
            "createdAt": "2025-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/session/sess-2/state"))
        .respond_with(ok(json!({
            "sessionId": "sess-2",
            "status": "generating",
            "createdAt": "2025-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;

    let api = Arc::new(ApiClient::from_base_url(server.uri()));
    let session = SessionHandle::new(Arc::clone(&api));
    session.create(None).await.unwrap();

    // The backend never reaches a terminal state; the bounded wait expires.
    let poller = Poller::new();
    let probe_api = Arc::clone(&api);
    poller
        .start(
            move || {
                let api = Arc::clone(&probe_api);
                async move { api.get_session_state("sess-2").await }
            },
            Duration::from_millis(50),
            StopWhen::result(|s: &SessionData| s.status.is_terminal()).max_attempts(3),
        )
        .await;
    poller.wait().await;

    let snap = poller.snapshot().await;
    assert_eq!(snap.state, PollerState::Stopped(StopReason::Exhausted));
    assert_eq!(snap.attempts, 3);

    // Timeout is the one status assigned locally.
    session.mark_timed_out().await;
    let state = session.snapshot().await.data.unwrap();
    assert_eq!(state.status, SessionStatus::Timeout);
}
