//! Local notification surface backed by structured logging.
//!
//! Real OS notification delivery is a platform concern outside this
//! workspace; this implementation renders the same keyed notification
//! records through `tracing` so the delivery contract (one in-progress
//! notification per session, exactly one terminal notification that cancels
//! it) stays observable and testable.

use async_trait::async_trait;
use tokio::sync::Mutex;

use upcrib_core::repository::{Notification, Notifier};
use upcrib_core::Result;

/// `tracing`-backed notifier that remembers which notification ids are
/// currently displayed.
#[derive(Default)]
pub struct TracingNotifier {
    active: Mutex<Vec<String>>,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of currently displayed notifications (test/diagnostic hook).
    pub async fn active_ids(&self) -> Vec<String> {
        self.active.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn display(&self, notification: Notification) -> Result<()> {
        tracing::info!(
            id = %notification.id,
            session_id = %notification.session_id,
            kind = ?notification.kind,
            title = %notification.title,
            body = %notification.body,
            "notification"
        );
        let mut active = self.active.lock().await;
        if !active.contains(&notification.id) {
            active.push(notification.id);
        }
        Ok(())
    }

    async fn cancel(&self, notification_id: &str) -> Result<()> {
        self.active
            .lock()
            .await
            .retain(|id| id != notification_id);
        Ok(())
    }

    async fn cancel_all(&self) -> Result<()> {
        self.active.lock().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_terminal_notification_cancels_started() {
        let notifier = TracingNotifier::new();

        notifier.notify_generation_started("s1").await.unwrap();
        assert_eq!(notifier.active_ids().await, vec!["generation-s1"]);

        notifier.notify_generation_complete("s1").await.unwrap();
        assert_eq!(notifier.active_ids().await, vec!["complete-s1"]);
    }

    #[tokio::test]
    async fn test_failed_notification_cancels_started() {
        let notifier = TracingNotifier::new();

        notifier.notify_generation_started("s1").await.unwrap();
        notifier.notify_generation_failed("s1").await.unwrap();
        assert_eq!(notifier.active_ids().await, vec!["failed-s1"]);

        notifier.cancel_all().await.unwrap();
        assert!(notifier.active_ids().await.is_empty());
    }
}
