//! Durable local record of past designs.
//!
//! The whole history lives in one JSON file, rewritten on every mutation
//! (read-modify-write, serialized through an internal mutex so two racing
//! saves cannot interleave). Referenced images are cached best-effort into
//! the images directory; a failed download keeps the remote reference.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

use upcrib_core::history::{DesignHistoryItem, DesignStatus, HISTORY_CAP};
use upcrib_core::{Result, UpcribError};

use crate::image_cache::{ImageCache, ImageRole, RemoteImageFetcher};
use crate::paths::UpcribPaths;

const HISTORY_FILE_NAME: &str = "design_history.json";
const IMAGES_DIR_NAME: &str = "design_images";

/// Storage diagnostics, mainly for the CLI and debugging.
#[derive(Debug)]
pub struct StorageInfo {
    pub history_file: PathBuf,
    pub images_dir: PathBuf,
    pub history_file_exists: bool,
    pub images_dir_exists: bool,
    pub history_count: usize,
}

/// Append/update/delete layer over the persisted design list.
pub struct HistoryStore {
    history_file: PathBuf,
    images: ImageCache,
    // Serializes read-modify-write cycles; see the module docs.
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// Creates a store rooted at `base_dir` (`design_history.json` +
    /// `design_images/`).
    pub fn new(base_dir: impl AsRef<Path>, fetcher: Arc<dyn RemoteImageFetcher>) -> Self {
        let base_dir = base_dir.as_ref();
        Self {
            history_file: base_dir.join(HISTORY_FILE_NAME),
            images: ImageCache::new(base_dir.join(IMAGES_DIR_NAME), fetcher),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a store at the platform data directory.
    pub fn default_location(fetcher: Arc<dyn RemoteImageFetcher>) -> Result<Self> {
        let base_dir = UpcribPaths::data_dir()
            .map_err(|e| UpcribError::storage(format!("Failed to resolve data directory: {e}")))?;
        Ok(Self::new(base_dir, fetcher))
    }

    /// Saves a design, caching its images locally first.
    ///
    /// Upsert identity is `session_id`: an existing entry is replaced in
    /// place, a new one goes to the head. The list is then truncated to the
    /// 100 most recent entries and written back whole; evicted entries lose
    /// their cached image files.
    pub async fn save(&self, mut item: DesignHistoryItem) -> Result<()> {
        let local_thumbnail = self
            .images
            .cache(&item.thumbnail, &item.session_id, ImageRole::Thumbnail)
            .await;
        item.local_thumbnail_path = Some(local_thumbnail);

        if let Some(original) = item.original_image.clone() {
            let local_original = self
                .images
                .cache(&original, &item.session_id, ImageRole::Original)
                .await;
            item.local_original_path = Some(local_original);
        }

        let _guard = self.write_lock.lock().await;
        let mut history = self.read_list().await?;

        match history.iter().position(|existing| existing.session_id == item.session_id) {
            Some(index) => history[index] = item,
            None => history.insert(0, item),
        }
        if history.len() > HISTORY_CAP {
            // Entries falling off the cap take their cached files with them.
            for evicted in history.split_off(HISTORY_CAP) {
                self.remove_cached_images(&evicted).await;
            }
        }

        self.write_list(&history).await
    }

    /// Returns the persisted list. A missing backing file is the expected
    /// first-run state and yields an empty list; an unparseable file is
    /// logged and treated the same way rather than failing reads forever.
    pub async fn list(&self) -> Result<Vec<DesignHistoryItem>> {
        self.read_list().await
    }

    pub async fn get(&self, session_id: &str) -> Result<Option<DesignHistoryItem>> {
        let history = self.read_list().await?;
        Ok(history.into_iter().find(|item| item.session_id == session_id))
    }

    /// Deletes one entry and its cached image files. Deleting a session
    /// that is not present is a no-op.
    pub async fn delete(&self, session_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let history = self.read_list().await?;

        let Some(item) = history.iter().find(|item| item.session_id == session_id) else {
            return Ok(());
        };
        self.remove_cached_images(item).await;

        let filtered: Vec<DesignHistoryItem> = history
            .into_iter()
            .filter(|item| item.session_id != session_id)
            .collect();
        self.write_list(&filtered).await
    }

    /// Deletes every cached image file, then writes an empty list.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let history = self.read_list().await?;
        for item in &history {
            self.remove_cached_images(item).await;
        }
        self.write_list(&[]).await
    }

    /// Updates the title of one entry in place. Unknown sessions are a
    /// no-op.
    pub async fn update_title(&self, session_id: &str, title: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut history = self.read_list().await?;

        let Some(item) = history.iter_mut().find(|item| item.session_id == session_id) else {
            tracing::debug!(session_id, "update_title: no such entry");
            return Ok(());
        };
        item.title = title.to_string();

        self.write_list(&history).await
    }

    /// Seeds demo content when the list is empty. Returns whether seeding
    /// happened. First-run demo data is opt-in only; `list()` never
    /// substitutes fixtures for a genuinely empty history.
    pub async fn seed_if_empty(&self) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let history = self.read_list().await?;
        if !history.is_empty() {
            return Ok(false);
        }
        self.write_list(&sample_designs()).await?;
        Ok(true)
    }

    pub async fn storage_info(&self) -> Result<StorageInfo> {
        let history = self.read_list().await?;
        Ok(StorageInfo {
            history_file: self.history_file.clone(),
            images_dir: self.images.dir().to_path_buf(),
            history_file_exists: fs::try_exists(&self.history_file).await?,
            images_dir_exists: fs::try_exists(self.images.dir()).await?,
            history_count: history.len(),
        })
    }

    async fn remove_cached_images(&self, item: &DesignHistoryItem) {
        for path in [&item.local_thumbnail_path, &item.local_original_path]
            .into_iter()
            .flatten()
        {
            if let Err(e) = self.images.remove(path).await {
                tracing::warn!(path, error = %e, "failed to remove cached image");
            }
        }
    }

    async fn read_list(&self) -> Result<Vec<DesignHistoryItem>> {
        if !fs::try_exists(&self.history_file).await? {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.history_file).await?;
        match serde_json::from_str(&raw) {
            Ok(history) => Ok(history),
            Err(e) => {
                tracing::warn!(error = %e, "history file unreadable, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn write_list(&self, history: &[DesignHistoryItem]) -> Result<()> {
        if let Some(parent) = self.history_file.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(history)?;
        fs::write(&self.history_file, json).await?;
        Ok(())
    }
}

/// Demo entries shown by `seed_if_empty`.
fn sample_designs() -> Vec<DesignHistoryItem> {
    let titles = [
        "Modern Living Room",
        "Kitchen Renovation",
        "Bedroom Makeover",
    ];
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let n = i + 1;
            DesignHistoryItem {
                status: DesignStatus::Completed,
                original_image: Some(format!(
                    "https://picsum.photos/300/300?random={}",
                    n * 2
                )),
                ..DesignHistoryItem::generating(
                    format!("sample-{n:03}"),
                    format!("https://picsum.photos/300/300?random={}", n * 2 - 1),
                )
                .with_title(*title)
            }
        })
        .collect()
}
