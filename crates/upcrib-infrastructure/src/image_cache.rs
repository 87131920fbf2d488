//! Best-effort local caching of remote design images.
//!
//! Sources may be `http(s)://` URLs, `file://` URIs, or bare local paths.
//! Caching is never load-bearing: any failure falls back to keeping the
//! original remote reference.

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use upcrib_core::{Result, UpcribError};

/// Fetches raw image bytes from a remote URL. Injectable so filesystem
/// tests never touch the network.
#[async_trait]
pub trait RemoteImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// reqwest-backed fetcher used in production wiring.
#[derive(Clone, Default)]
pub struct HttpImageFetcher {
    http: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RemoteImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| UpcribError::transport(format!("Failed to download image: {e}")))?;

        if !response.status().is_success() {
            return Err(UpcribError::transport(format!(
                "Failed to download image: HTTP {}",
                response.status().as_u16()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpcribError::transport(format!("Failed to download image: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// Which slot of a history item an image fills; part of the cached filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Thumbnail,
    Original,
}

impl ImageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thumbnail => "thumbnail",
            Self::Original => "original",
        }
    }
}

/// Directory of locally cached images, one file per session and role.
pub struct ImageCache {
    dir: PathBuf,
    fetcher: Arc<dyn RemoteImageFetcher>,
}

impl ImageCache {
    pub fn new(dir: impl AsRef<Path>, fetcher: Arc<dyn RemoteImageFetcher>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            fetcher,
        }
    }

    /// Generates the per-session, per-role cache filename.
    fn file_name(session_id: &str, role: ImageRole) -> String {
        format!(
            "{}_{}_{}.jpg",
            session_id,
            role.as_str(),
            Utc::now().timestamp_millis()
        )
    }

    /// Caches `source` locally and returns the local path. On any failure
    /// the original reference is returned unchanged so the caller keeps a
    /// working (remote) image.
    pub async fn cache(&self, source: &str, session_id: &str, role: ImageRole) -> String {
        match self.cache_inner(source, session_id, role).await {
            Ok(local_path) => local_path.to_string_lossy().into_owned(),
            Err(e) => {
                tracing::warn!(source, session_id, error = %e, "image caching failed, keeping remote reference");
                source.to_string()
            }
        }
    }

    async fn cache_inner(
        &self,
        source: &str,
        session_id: &str,
        role: ImageRole,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).await?;
        let local_path = self.dir.join(Self::file_name(session_id, role));

        if source.starts_with("http://") || source.starts_with("https://") {
            let bytes = self.fetcher.fetch(source).await?;
            fs::write(&local_path, bytes).await?;
        } else {
            // file:// URI or bare local path
            let source_path = source.strip_prefix("file://").unwrap_or(source);
            fs::copy(source_path, &local_path).await?;
        }

        Ok(local_path)
    }

    /// Removes a cached file. Missing files are the expected case after cap
    /// eviction or repeated deletes, never an error.
    pub async fn remove(&self, path: &str) -> Result<()> {
        if fs::try_exists(path).await? {
            fs::remove_file(path).await?;
        }
        Ok(())
    }

    /// Whether a path points inside this cache directory.
    pub fn contains(&self, path: &str) -> bool {
        Path::new(path).starts_with(&self.dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FixedFetcher(Vec<u8>);

    #[async_trait]
    impl RemoteImageFetcher for FixedFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl RemoteImageFetcher for FailingFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            Err(UpcribError::transport(format!("unreachable: {url}")))
        }
    }

    #[tokio::test]
    async fn test_remote_source_is_downloaded() {
        let temp_dir = TempDir::new().unwrap();
        let cache = ImageCache::new(temp_dir.path(), Arc::new(FixedFetcher(b"jpegdata".to_vec())));

        let local = cache
            .cache("https://backend/generated/x.jpg", "s1", ImageRole::Thumbnail)
            .await;
        assert!(local.contains("s1_thumbnail_"));
        assert_eq!(std::fs::read(&local).unwrap(), b"jpegdata");
    }

    #[tokio::test]
    async fn test_local_path_is_copied() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.jpg");
        std::fs::write(&source, b"local").unwrap();

        let cache = ImageCache::new(temp_dir.path().join("cache"), Arc::new(FailingFetcher));
        let local = cache
            .cache(
                &format!("file://{}", source.display()),
                "s2",
                ImageRole::Original,
            )
            .await;
        assert!(local.contains("s2_original_"));
        assert_eq!(std::fs::read(&local).unwrap(), b"local");
    }

    #[tokio::test]
    async fn test_download_failure_keeps_remote_reference() {
        let temp_dir = TempDir::new().unwrap();
        let cache = ImageCache::new(temp_dir.path(), Arc::new(FailingFetcher));

        let result = cache
            .cache("https://backend/generated/x.jpg", "s3", ImageRole::Thumbnail)
            .await;
        assert_eq!(result, "https://backend/generated/x.jpg");
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let cache = ImageCache::new(temp_dir.path(), Arc::new(FailingFetcher));

        let path = temp_dir.path().join("gone.jpg");
        cache.remove(&path.to_string_lossy()).await.unwrap();

        std::fs::write(&path, b"x").unwrap();
        cache.remove(&path.to_string_lossy()).await.unwrap();
        assert!(!path.exists());
        cache.remove(&path.to_string_lossy()).await.unwrap();
    }
}
