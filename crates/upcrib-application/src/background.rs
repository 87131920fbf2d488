//! Background tracking of in-flight generation jobs.
//!
//! The service keeps one timer per tracked session, probing renovation
//! status on a fixed interval. Terminal states save the result into local
//! history, emit a notification, and stop tracking. The tracked set is
//! mirrored in memory and persisted through a `TrackingStore` selected once
//! at initialization: a capability probe failure degrades to in-memory
//! tracking for the rest of the process lifetime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio::time;
use tokio_util::sync::CancellationToken;

use upcrib_core::config::AppConfig;
use upcrib_core::history::{DesignHistoryItem, DesignStatus};
use upcrib_core::repository::{Notifier, StatusSource, TrackingStore};
use upcrib_core::session::RenovationStatus;
use upcrib_core::tracking::PollingSession;
use upcrib_infrastructure::{HistoryStore, MemoryTrackingStore};

/// Tracks generation jobs across the app lifecycle.
///
/// Construct one instance and share it via `Arc`; every method that spawns
/// timers takes `self: &Arc<Self>`.
pub struct BackgroundPollingService {
    status: Arc<dyn StatusSource>,
    notifier: Arc<dyn Notifier>,
    history: Arc<HistoryStore>,
    store: RwLock<Arc<dyn TrackingStore>>,
    timers: Mutex<HashMap<String, CancellationToken>>,
    tracked: RwLock<Vec<PollingSession>>,
    poll_interval: Duration,
    base_url: String,
    initialized: Mutex<bool>,
}

impl BackgroundPollingService {
    pub fn new(
        status: Arc<dyn StatusSource>,
        notifier: Arc<dyn Notifier>,
        history: Arc<HistoryStore>,
        store: Arc<dyn TrackingStore>,
        config: &AppConfig,
    ) -> Self {
        Self {
            status,
            notifier,
            history,
            store: RwLock::new(store),
            timers: Mutex::new(HashMap::new()),
            tracked: RwLock::new(Vec::new()),
            poll_interval: config.generation_poll_interval(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            initialized: Mutex::new(false),
        }
    }

    /// Probes the tracking store, restores persisted sessions, and resumes
    /// polling for each one that is still within the tracking ceiling.
    ///
    /// Idempotent; the second and later calls are no-ops. Never fails: a
    /// broken store only costs durability.
    pub async fn initialize(self: &Arc<Self>) {
        let mut initialized = self.initialized.lock().await;
        if *initialized {
            return;
        }

        let store = self.store.read().await.clone();
        if let Err(err) = store.probe().await {
            tracing::warn!(error = %err, "tracking store unavailable, using in-memory tracking");
            *self.store.write().await = Arc::new(MemoryTrackingStore::new());
        }

        let persisted = match self.store.read().await.load().await {
            Ok(sessions) => sessions,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load tracked sessions");
                Vec::new()
            }
        };

        let now_ms = Utc::now().timestamp_millis();
        let (live, expired): (Vec<_>, Vec<_>) = persisted
            .into_iter()
            .partition(|session| !session.is_expired(now_ms));
        for session in &expired {
            tracing::info!(
                session_id = %session.session_id,
                "evicting tracked session past the 30-minute ceiling"
            );
        }

        *self.tracked.write().await = live.clone();
        self.persist_tracked().await;

        for session in live {
            // Immediate check: the job may have finished while the process
            // was down.
            self.start_timer(session.session_id, true).await;
        }

        *initialized = true;
        tracing::debug!("background polling service initialized");
    }

    /// Starts tracking a generation job. Adding an already-tracked session
    /// is a no-op.
    pub async fn add_session(self: &Arc<Self>, session_id: &str) {
        let newly_added = {
            let mut tracked = self.tracked.write().await;
            if tracked.iter().any(|s| s.session_id == session_id) {
                tracing::debug!(session_id, "session already tracked");
                false
            } else {
                tracked.push(PollingSession::new(session_id));
                true
            }
        };

        if newly_added {
            self.persist_tracked().await;
            if let Err(err) = self.notifier.notify_generation_started(session_id).await {
                tracing::warn!(error = %err, "failed to show start notification");
            }
            self.mark_notification_shown(session_id).await;
        }

        // Timer startup never depends on persistence having succeeded.
        self.start_timer(session_id.to_string(), false).await;
    }

    /// Stops tracking a session: the timer is cancelled before the record
    /// is dropped so no tick can fire for an untracked session.
    pub async fn remove_session(&self, session_id: &str) {
        if let Some(token) = self.timers.lock().await.remove(session_id) {
            token.cancel();
        }
        {
            let mut tracked = self.tracked.write().await;
            tracked.retain(|s| s.session_id != session_id);
        }
        self.persist_tracked().await;
    }

    /// Cancels every timer without touching the persisted records, so a
    /// later `initialize()` can resume them.
    pub async fn stop_all(&self) {
        let mut timers = self.timers.lock().await;
        for (_, token) in timers.drain() {
            token.cancel();
        }
    }

    pub async fn is_tracking(&self, session_id: &str) -> bool {
        self.timers.lock().await.contains_key(session_id)
    }

    pub async fn tracked_sessions(&self) -> Vec<PollingSession> {
        self.tracked.read().await.clone()
    }

    async fn start_timer(self: &Arc<Self>, session_id: String, immediate: bool) {
        let mut timers = self.timers.lock().await;
        if timers.contains_key(&session_id) {
            return;
        }
        let token = CancellationToken::new();
        timers.insert(session_id.clone(), token.clone());
        drop(timers);

        let service = Arc::clone(self);
        let interval = self.poll_interval;
        tokio::spawn(async move {
            if !immediate {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = time::sleep(interval) => {}
                }
            }
            loop {
                service.check_session(&session_id).await;
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = time::sleep(interval) => {}
                }
            }
        });
    }

    /// One poll tick. Probe errors are logged and polling continues.
    async fn check_session(&self, session_id: &str) {
        let expired = {
            let now_ms = Utc::now().timestamp_millis();
            self.tracked
                .read()
                .await
                .iter()
                .any(|s| s.session_id == session_id && s.is_expired(now_ms))
        };
        if expired {
            tracing::warn!(session_id, "dropping session past the tracking ceiling");
            self.remove_session(session_id).await;
            return;
        }

        match self.status.renovation_status(session_id).await {
            Ok(status) if status.is_complete() => self.handle_complete(status).await,
            Ok(status) if status.is_failed() => self.handle_failed(status).await,
            Ok(status) => {
                tracing::debug!(session_id, status = ?status.status, "still generating");
            }
            Err(err) => {
                tracing::debug!(session_id, error = %err, "background status check failed");
            }
        }
    }

    async fn handle_complete(&self, status: RenovationStatus) {
        let session_id = status.session_id.clone();
        tracing::info!(session_id = %session_id, "generation complete");

        let mut item = self.existing_or_new(&session_id, &status).await;
        if let Some(generated) = &status.generated_image {
            let url = generated
                .url
                .clone()
                .or_else(|| generated.path.clone())
                .unwrap_or_else(|| format!("/generated/{}", generated.filename));
            item.thumbnail = self.absolute_url(&url);
            item.generated_image = Some(generated.clone());
        }
        item.status = DesignStatus::Completed;

        if let Err(err) = self.history.save(item).await {
            tracing::warn!(error = %err, "failed to save completed design to history");
        }
        if let Err(err) = self.notifier.notify_generation_complete(&session_id).await {
            tracing::warn!(error = %err, "failed to show completion notification");
        }
        self.remove_session(&session_id).await;
    }

    async fn handle_failed(&self, status: RenovationStatus) {
        let session_id = status.session_id.clone();
        tracing::info!(session_id = %session_id, "generation failed");

        let mut item = self.existing_or_new(&session_id, &status).await;
        item.status = DesignStatus::Failed;

        if let Err(err) = self.history.save(item).await {
            tracing::warn!(error = %err, "failed to record failed design in history");
        }
        if let Err(err) = self.notifier.notify_generation_failed(&session_id).await {
            tracing::warn!(error = %err, "failed to show failure notification");
        }
        self.remove_session(&session_id).await;
    }

    /// Loads the session's history entry, or builds a fresh one from the
    /// probe result when the job was started without a history record.
    async fn existing_or_new(
        &self,
        session_id: &str,
        status: &RenovationStatus,
    ) -> DesignHistoryItem {
        let existing = match self.history.get(session_id).await {
            Ok(existing) => existing,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read history entry");
                None
            }
        };

        let mut item = existing.unwrap_or_else(|| {
            let original = status
                .original_image
                .as_ref()
                .and_then(|img| img.url.clone())
                .map(|url| self.absolute_url(&url))
                .unwrap_or_default();
            DesignHistoryItem::generating(session_id, original)
        });

        if item.original_image.is_none() {
            item.original_image = status
                .original_image
                .as_ref()
                .and_then(|img| img.url.clone())
                .map(|url| self.absolute_url(&url));
        }
        if let Some(style) = &status.style_data {
            item.style_data = Some(style.clone());
        }
        item
    }

    async fn mark_notification_shown(&self, session_id: &str) {
        let mut tracked = self.tracked.write().await;
        if let Some(session) = tracked.iter_mut().find(|s| s.session_id == session_id) {
            session.notification_shown = true;
        }
        drop(tracked);
        self.persist_tracked().await;
    }

    /// Writes the in-memory mirror through the selected store, best-effort.
    async fn persist_tracked(&self) {
        let snapshot = self.tracked.read().await.clone();
        let store = self.store.read().await.clone();
        if let Err(err) = store.save(&snapshot).await {
            tracing::warn!(error = %err, "failed to persist tracked sessions");
        }
    }

    fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}
