//! Persistence backends for the background polling service's tracked set.
//!
//! Two implementations of the `TrackingStore` capability: a JSON-file
//! backend and an in-memory fallback. The background service probes the
//! file backend once at construction and degrades to in-memory for the
//! rest of the process lifetime when the probe fails.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

use upcrib_core::repository::TrackingStore;
use upcrib_core::tracking::PollingSession;
use upcrib_core::{Result, UpcribError};

use crate::paths::UpcribPaths;

/// JSON-array file backend (`polling_sessions.json`).
pub struct FileTrackingStore {
    file_path: PathBuf,
}

impl FileTrackingStore {
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }

    pub fn default_location() -> Result<Self> {
        let file_path = UpcribPaths::tracking_file()
            .map_err(|e| UpcribError::storage(format!("Failed to resolve tracking path: {e}")))?;
        Ok(Self::new(file_path))
    }
}

#[async_trait]
impl TrackingStore for FileTrackingStore {
    async fn load(&self) -> Result<Vec<PollingSession>> {
        if !fs::try_exists(&self.file_path).await? {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.file_path).await?;
        let sessions = serde_json::from_str(&raw)?;
        Ok(sessions)
    }

    async fn save(&self, sessions: &[PollingSession]) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string(sessions)?;
        fs::write(&self.file_path, json).await?;
        Ok(())
    }

    async fn probe(&self) -> Result<()> {
        let probe_path = self.file_path.with_extension("probe");
        if let Some(parent) = probe_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&probe_path, b"probe").await?;
        fs::remove_file(&probe_path).await?;
        Ok(())
    }
}

/// In-memory fallback used when persistent storage is unavailable. Tracked
/// jobs are lost across process restarts but polling within the running
/// process is unaffected.
#[derive(Default)]
pub struct MemoryTrackingStore {
    sessions: RwLock<Vec<PollingSession>>,
}

impl MemoryTrackingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrackingStore for MemoryTrackingStore {
    async fn load(&self) -> Result<Vec<PollingSession>> {
        Ok(self.sessions.read().await.clone())
    }

    async fn save(&self, sessions: &[PollingSession]) -> Result<()> {
        *self.sessions.write().await = sessions.to_vec();
        Ok(())
    }

    async fn probe(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTrackingStore::new(temp_dir.path().join("polling_sessions.json"));

        assert!(store.load().await.unwrap().is_empty());

        let sessions = vec![PollingSession::new("s1"), PollingSession::new("s2")];
        store.save(&sessions).await.unwrap();
        assert_eq!(store.load().await.unwrap(), sessions);

        store.save(&[]).await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_probe_leaves_no_residue() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTrackingStore::new(temp_dir.path().join("polling_sessions.json"));

        store.probe().await.unwrap();
        assert!(!temp_dir.path().join("polling_sessions.probe").exists());
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryTrackingStore::new();
        assert!(store.load().await.unwrap().is_empty());

        let sessions = vec![PollingSession::new("s1")];
        store.save(&sessions).await.unwrap();
        assert_eq!(store.load().await.unwrap(), sessions);
        store.probe().await.unwrap();
    }
}
