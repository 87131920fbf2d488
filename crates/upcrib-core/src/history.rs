//! Locally persisted design history records.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::{GeneratedImage, StyleData};

/// Maximum number of history entries kept on disk; older entries are
/// truncated from the tail on save.
pub const HISTORY_CAP: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignStatus {
    Generating,
    Completed,
    Failed,
}

/// A record of one past (or in-progress) design.
///
/// Identity for upsert purposes is `session_id`: at most one entry exists
/// per session, and saving an existing session replaces the entry in place.
/// The `id` field is a display-only identifier kept for compatibility with
/// the persisted JSON format; it is never used for lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignHistoryItem {
    pub id: String,
    pub session_id: String,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// Remote thumbnail URL.
    pub thumbnail: String,
    #[serde(default)]
    pub original_image: Option<String>,
    #[serde(default)]
    pub generated_image: Option<GeneratedImage>,
    /// Path of the locally cached thumbnail, when caching succeeded.
    #[serde(default)]
    pub local_thumbnail_path: Option<String>,
    #[serde(default)]
    pub local_original_path: Option<String>,
    pub status: DesignStatus,
    pub title: String,
    #[serde(default)]
    pub style_data: Option<StyleData>,
}

impl DesignHistoryItem {
    /// Creates a fresh `generating` entry for a just-started job.
    pub fn generating(session_id: impl Into<String>, thumbnail: impl Into<String>) -> Self {
        let session_id = session_id.into();
        // Session ids are server-assigned opaque strings; take the prefix by
        // characters, not bytes.
        let prefix: String = session_id.chars().take(8).collect();
        Self {
            id: Uuid::new_v4().to_string(),
            title: format!("Design {prefix}"),
            session_id,
            created_at: Utc::now().to_rfc3339(),
            thumbnail: thumbnail.into(),
            original_image: None,
            generated_image: None,
            local_thumbnail_path: None,
            local_original_path: None,
            status: DesignStatus::Generating,
            style_data: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_original_image(mut self, url: impl Into<String>) -> Self {
        self.original_image = Some(url.into());
        self
    }

    pub fn with_style_data(mut self, style_data: StyleData) -> Self {
        self.style_data = Some(style_data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generating_constructor() {
        let item = DesignHistoryItem::generating("session-12345678-rest", "/generated/x.jpg");
        assert_eq!(item.status, DesignStatus::Generating);
        assert_eq!(item.session_id, "session-12345678-rest");
        assert_eq!(item.title, "Design session-");
        assert!(item.generated_image.is_none());
        assert!(!item.id.is_empty());
    }

    #[test]
    fn test_generating_title_handles_multibyte_ids() {
        // The 8th byte of this id falls inside a multi-byte character.
        let item = DesignHistoryItem::generating("aaaaaaaé-123", "thumb.jpg");
        assert_eq!(item.title, "Design aaaaaaaé");

        let short = DesignHistoryItem::generating("日本語id", "thumb.jpg");
        assert_eq!(short.title, "Design 日本語id");
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let item = DesignHistoryItem::generating("abc", "thumb.jpg");
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("sessionId").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["status"], "generating");
    }
}
