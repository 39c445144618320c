//! Server-side persistence behind the HTTP endpoint.

mod blob;
mod file;
mod memory;

pub use blob::{BLOB_PATHNAME, BlobBackend};
pub use file::FileBackend;
pub use memory::MemoryBackend;

use async_trait::async_trait;

use crate::content::ContentMap;

#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error("{0}")]
    NotConfigured(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Blob store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Blob store returned {0}")]
    Status(reqwest::StatusCode),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where the endpoint keeps the single content document.
#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// Fails when required credentials are missing. Checked before any
    /// request is authenticated.
    fn ready(&self) -> Result<(), BackendError> {
        Ok(())
    }

    /// Current document; nothing stored yet reads as the empty map.
    async fn load(&self) -> Result<ContentMap, BackendError>;

    /// Replace the stored document.
    async fn store(&self, content: &ContentMap) -> Result<(), BackendError>;
}
