//! Blob storage for uploaded images.
//!
//! Handlers talk to the [`BlobStore`] trait. [`LocalBlobStore`] keeps blobs
//! under a directory on disk and derives public URLs from a configured base.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

/// Errors from the blob store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The key escapes the store root or is empty.
    #[error("invalid blob path '{0}'")]
    InvalidPath(String),

    #[error("blob '{0}' not found")]
    NotFound(String),

    #[error("blob I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `bytes` under `path`, replacing any existing blob.
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), StorageError>;

    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Remove a blob. Removing a missing blob succeeds.
    async fn remove(&self, path: &str) -> Result<(), StorageError>;

    /// URL clients use to fetch the blob.
    fn public_url(&self, path: &str) -> String;

    /// Confirm the store can accept writes.
    async fn check(&self) -> Result<(), StorageError>;
}

/// Filesystem-backed store rooted at a directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a path inside the root. Only plain components are
    /// accepted, so `..` and absolute keys are rejected.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !plain {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        tracing::debug!(path, size = bytes.len(), "Stored blob");
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let target = self.resolve(path)?;
        match tokio::fs::read(&target).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, path: &str) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path.trim_start_matches('/'))
    }

    async fn check(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let metadata = tokio::fs::metadata(&self.root).await?;
        if metadata.permissions().readonly() {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("storage root {} is read-only", self.root.display()),
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> LocalBlobStore {
        LocalBlobStore::new(dir.path(), "http://cdn.test/files/")
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        store.put("forms/1/driver/logo.png", b"png").await.unwrap();
        assert_eq!(store.get("forms/1/driver/logo.png").await.unwrap(), b"png");

        store.remove("forms/1/driver/logo.png").await.unwrap();
        assert!(matches!(
            store.get("forms/1/driver/logo.png").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_check_creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("nested"), "http://cdn.test/files");
        store.check().await.unwrap();
        assert!(dir.path().join("nested").is_dir());
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(&dir).remove("nothing/here.png").await.is_ok());
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        for bad in ["../escape.png", "/etc/passwd", "a/../../b", ""] {
            assert!(
                matches!(store.put(bad, b"x").await, Err(StorageError::InvalidPath(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_public_url_joins_base() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            store(&dir).public_url("forms/2/a.png"),
            "http://cdn.test/files/forms/2/a.png"
        );
    }
}
