//! Trait seams between the application layer and its collaborators.
//!
//! Implementations live in `upcrib-api` (status source) and
//! `upcrib-infrastructure` (tracking stores, notifier); tests substitute
//! mocks.

use async_trait::async_trait;

use crate::error::Result;
use crate::session::RenovationStatus;
use crate::tracking::PollingSession;

/// Source of renovation status for a session — the polling probe's target.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn renovation_status(&self, session_id: &str) -> Result<RenovationStatus>;
}

/// Persistence for the tracked polling-session set.
///
/// The whole set is written as one JSON array; load of a missing backing
/// file yields an empty set, never an error.
#[async_trait]
pub trait TrackingStore: Send + Sync {
    async fn load(&self) -> Result<Vec<PollingSession>>;

    async fn save(&self, sessions: &[PollingSession]) -> Result<()>;

    /// Capability probe: a trivial write followed by a delete. Used once at
    /// service construction to decide between persistent and in-memory
    /// tracking.
    async fn probe(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    GenerationStarted,
    GenerationComplete,
    GenerationFailed,
}

/// One local notification. Terminal kinds are keyed so that exactly one
/// terminal notification exists per session, and displaying one first
/// cancels the corresponding in-progress notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub session_id: String,
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn generation_started(session_id: &str) -> Self {
        Self {
            id: format!("generation-{session_id}"),
            kind: NotificationKind::GenerationStarted,
            session_id: session_id.to_string(),
            title: "Generating Your Design".to_string(),
            body: "Your AI-powered renovation is in progress. We'll notify you when it's ready!"
                .to_string(),
        }
    }

    pub fn generation_complete(session_id: &str) -> Self {
        Self {
            id: format!("complete-{session_id}"),
            kind: NotificationKind::GenerationComplete,
            session_id: session_id.to_string(),
            title: "Your Design is Ready!".to_string(),
            body: "Tap to view your AI-generated renovation design.".to_string(),
        }
    }

    pub fn generation_failed(session_id: &str) -> Self {
        Self {
            id: format!("failed-{session_id}"),
            kind: NotificationKind::GenerationFailed,
            session_id: session_id.to_string(),
            title: "Design Generation Failed".to_string(),
            body: "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// Local notification surface.
///
/// The provided `notify_*` helpers encode the delivery contract; an
/// implementation only has to display and cancel by id.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn display(&self, notification: Notification) -> Result<()>;

    async fn cancel(&self, notification_id: &str) -> Result<()>;

    async fn cancel_all(&self) -> Result<()>;

    async fn notify_generation_started(&self, session_id: &str) -> Result<()> {
        self.display(Notification::generation_started(session_id))
            .await
    }

    /// Cancels the in-progress notification, then shows the completion one.
    async fn notify_generation_complete(&self, session_id: &str) -> Result<()> {
        self.cancel(&format!("generation-{session_id}")).await?;
        self.display(Notification::generation_complete(session_id))
            .await
    }

    /// Cancels the in-progress notification, then shows the failure one.
    async fn notify_generation_failed(&self, session_id: &str) -> Result<()> {
        self.cancel(&format!("generation-{session_id}")).await?;
        self.display(Notification::generation_failed(session_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_ids_are_keyed_by_session() {
        assert_eq!(Notification::generation_started("s1").id, "generation-s1");
        assert_eq!(Notification::generation_complete("s1").id, "complete-s1");
        assert_eq!(Notification::generation_failed("s1").id, "failed-s1");
    }
}
