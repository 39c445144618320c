use async_trait::async_trait;
use std::{io, path::PathBuf};

use super::{BackendError, ContentBackend};
use crate::content::{ContentMap, parse_content};

/// Single pretty-printed JSON file on local disk.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl ContentBackend for FileBackend {
    async fn load(&self) -> Result<ContentMap, BackendError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(parse_content(Some(&raw))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ContentMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, content: &ContentMap) -> Result<(), BackendError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let text = serde_json::to_string_pretty(content)?;
        tokio::fs::write(&self.path, text).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("content.json"));
        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");
        tokio::fs::write(&path, "[not an object").await.unwrap();
        assert!(FileBackend::new(path).load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_writes_pretty_json_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("content.json");
        let backend = FileBackend::new(&path);

        let mut content = ContentMap::new();
        content.insert("hero.title".into(), json!("Hi"));
        backend.store(&content).await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(raw, "{\n  \"hero.title\": \"Hi\"\n}");
        assert_eq!(backend.load().await.unwrap(), content);
    }
}
