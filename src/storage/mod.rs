//! Client-side persistence for the content map.

mod http;
mod local;

pub use http::{HttpAdapter, PASSWORD_HEADER, cookie_client};
pub use local::{DEFAULT_STORAGE_KEY, FileSlot, KeyValueSlot, LocalAdapter, MemorySlot};

use async_trait::async_trait;

use crate::content::ContentMap;

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Uniform load/save contract over the content map.
///
/// Built-in adapters never fail `load`: any underlying error reads as the
/// empty map. `save` errors propagate to the caller.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    async fn load(&self) -> Result<ContentMap, StorageError>;
    async fn save(&self, content: &ContentMap) -> Result<(), StorageError>;
}
