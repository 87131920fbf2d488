pub mod config_service;
pub mod history_store;
pub mod image_cache;
pub mod notifier;
pub mod paths;
pub mod tracking_store;

pub use crate::config_service::ConfigService;
pub use crate::history_store::HistoryStore;
pub use crate::image_cache::{HttpImageFetcher, ImageCache, RemoteImageFetcher};
pub use crate::notifier::TracingNotifier;
pub use crate::tracking_store::{FileTrackingStore, MemoryTrackingStore};
