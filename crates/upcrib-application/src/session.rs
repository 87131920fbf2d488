//! Session lifecycle handle.

use std::sync::Arc;

use tokio::sync::RwLock;

use upcrib_api::ApiClient;
use upcrib_core::session::{SessionData, SessionStatus};
use upcrib_core::{Result, UpcribError};

use crate::state::OpState;

/// Handle for creating and observing one renovation session.
///
/// Every operation records its outcome in an observable `{data, loading,
/// error}` snapshot; callers can either use the returned `Result` directly
/// or read the snapshot between calls.
pub struct SessionHandle {
    api: Arc<ApiClient>,
    state: RwLock<OpState<SessionData>>,
}

impl SessionHandle {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: RwLock::new(OpState::default()),
        }
    }

    pub async fn snapshot(&self) -> OpState<SessionData> {
        self.state.read().await.clone()
    }

    pub async fn session_id(&self) -> Option<String> {
        self.state
            .read()
            .await
            .data
            .as_ref()
            .map(|s| s.session_id.clone())
    }

    /// Creates a fresh session on the backend and makes it current.
    pub async fn create(&self, user_id: Option<&str>) -> Result<SessionData> {
        self.state.write().await.begin();
        match self.api.create_session(user_id).await {
            Ok(session) => {
                self.state.write().await.succeed(session.clone());
                Ok(session)
            }
            Err(err) => {
                self.state.write().await.fail(err.user_message());
                Err(err)
            }
        }
    }

    /// Fetches the full state of a session and makes it current.
    pub async fn get_state(&self, session_id: &str) -> Result<SessionData> {
        self.state.write().await.begin();
        match self.api.get_session_state(session_id).await {
            Ok(session) => {
                self.state.write().await.succeed(session.clone());
                Ok(session)
            }
            Err(err) => {
                self.state.write().await.fail(err.user_message());
                Err(err)
            }
        }
    }

    /// Re-fetches the current session's state.
    pub async fn refresh(&self) -> Result<SessionData> {
        let session_id = self
            .session_id()
            .await
            .ok_or_else(|| UpcribError::internal("No session to refresh"))?;
        self.get_state(&session_id).await
    }

    /// Marks the current session as timed out.
    ///
    /// This is the only status the client assigns locally; it is used when a
    /// bounded wait for a server-side transition expires.
    pub async fn mark_timed_out(&self) {
        let mut state = self.state.write().await;
        if let Some(session) = state.data.as_mut() {
            session.status = SessionStatus::Timeout;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn envelope(data: serde_json::Value) -> serde_json::Value {
        json!({ "success": true, "data": data })
    }

    #[tokio::test]
    async fn test_create_then_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "sessionId": "s1",
                "status": "created",
                "createdAt": "2025-01-01T00:00:00Z"
            }))))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/session/s1/state"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "sessionId": "s1",
                "status": "uploaded",
                "createdAt": "2025-01-01T00:00:00Z",
                "hasImage": true
            }))))
            .mount(&server)
            .await;

        let api = Arc::new(ApiClient::from_base_url(server.uri()));
        let handle = SessionHandle::new(api);

        let session = handle.create(None).await.unwrap();
        assert_eq!(session.session_id, "s1");

        let refreshed = handle.refresh().await.unwrap();
        assert_eq!(refreshed.status, SessionStatus::Uploaded);
        assert!(refreshed.has_image);

        let snap = handle.snapshot().await;
        assert!(!snap.loading);
        assert!(snap.error.is_none());
    }

    #[tokio::test]
    async fn test_failure_is_recorded_in_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/session"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "success": false,
                "error": { "message": "session store unavailable" }
            })))
            .mount(&server)
            .await;

        let api = Arc::new(ApiClient::from_base_url(server.uri()));
        let handle = SessionHandle::new(api);

        assert!(handle.create(None).await.is_err());
        let snap = handle.snapshot().await;
        assert_eq!(snap.error.as_deref(), Some("session store unavailable"));
        assert!(snap.data.is_none());

        assert!(handle.refresh().await.is_err());
    }

    #[tokio::test]
    async fn test_mark_timed_out_sets_local_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "sessionId": "s1",
                "status": "generating",
                "createdAt": "2025-01-01T00:00:00Z"
            }))))
            .mount(&server)
            .await;

        let api = Arc::new(ApiClient::from_base_url(server.uri()));
        let handle = SessionHandle::new(api);
        handle.create(None).await.unwrap();
        handle.mark_timed_out().await;

        let snap = handle.snapshot().await;
        assert_eq!(snap.data.unwrap().status, SessionStatus::Timeout);
    }
}
