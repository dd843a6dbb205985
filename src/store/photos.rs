use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::fs;
use tracing::debug;

use super::{PhotoHandle, PhotoStore, StoreError};

/// Keeps uploaded photos on local disk. The directory is served by the
/// router under `url_prefix`.
#[derive(Debug, Clone)]
pub struct LocalPhotoStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalPhotoStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl PhotoStore for LocalPhotoStore {
    async fn upload(&self, key: &str, bytes: Bytes) -> Result<PhotoHandle, StoreError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        debug!("Writing {} bytes to {}", bytes.len(), path.display());
        fs::write(&path, &bytes).await?;
        Ok(PhotoHandle {
            key: key.to_string(),
        })
    }

    async fn public_url(&self, handle: &PhotoHandle) -> Result<String, StoreError> {
        self.resolve(&handle.key)?;
        Ok(format!("{}/{}", self.url_prefix, handle.key))
    }
}
