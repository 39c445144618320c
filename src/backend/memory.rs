use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BackendError, ContentBackend};
use crate::content::ContentMap;

/// Process-lifetime backend; contents vanish on restart.
#[derive(Default)]
pub struct MemoryBackend {
    content: RwLock<ContentMap>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentBackend for MemoryBackend {
    async fn load(&self) -> Result<ContentMap, BackendError> {
        Ok(self.content.read().await.clone())
    }

    async fn store(&self, content: &ContentMap) -> Result<(), BackendError> {
        *self.content.write().await = content.clone();
        Ok(())
    }
}
