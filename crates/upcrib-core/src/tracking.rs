//! Background generation-tracking records.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Tracked jobs older than this are treated as abandoned and evicted on
/// restore instead of resuming polling.
pub const MAX_TRACKING_AGE_MS: i64 = 30 * 60 * 1000;

/// One in-flight generation job tracked by the background polling service.
///
/// The full set is persisted as a JSON array under a single file; an
/// in-memory mirror is kept in sync on every mutation so a storage outage
/// degrades durability, not correctness within the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingSession {
    pub session_id: String,
    /// Epoch milliseconds at which the job was first tracked.
    pub started_at: i64,
    #[serde(default)]
    pub notification_shown: bool,
}

impl PollingSession {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            started_at: Utc::now().timestamp_millis(),
            notification_shown: false,
        }
    }

    /// Whether this record has exceeded the 30-minute tracking ceiling.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms - self.started_at > MAX_TRACKING_AGE_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_is_not_expired() {
        let session = PollingSession::new("s1");
        assert!(!session.is_expired(Utc::now().timestamp_millis()));
    }

    #[test]
    fn test_expiry_at_boundary() {
        let session = PollingSession {
            session_id: "s1".to_string(),
            started_at: 0,
            notification_shown: false,
        };
        assert!(!session.is_expired(MAX_TRACKING_AGE_MS));
        assert!(session.is_expired(MAX_TRACKING_AGE_MS + 1));
    }

    #[test]
    fn test_serde_round_trip() {
        let session = PollingSession::new("abc");
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("sessionId"));
        assert!(json.contains("startedAt"));
        let back: PollingSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }
}
