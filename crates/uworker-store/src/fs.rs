use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StoreError;
use crate::storage_traits::{split_path, IoStore, StoreResult};

/// Filesystem-backed blob store.
///
/// Layout: `<root>/<bucket>/<name>`
pub struct FsIoStore {
    root: PathBuf,
}

impl FsIoStore {
    /// Create a new `FsIoStore` rooted at `root`. Creates `root` if needed.
    pub fn new(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn blob_path(&self, path: &str) -> StoreResult<PathBuf> {
        let (bucket, name) = split_path(path)?;
        Ok(self.root.join(bucket).join(name))
    }
}

#[async_trait]
impl IoStore for FsIoStore {
    async fn put(&self, path: &str, data: &[u8]) -> StoreResult<()> {
        let target = self.blob_path(path)?;
        let data = data.to_vec();
        debug!(path = %path, size = data.len(), "writing blob");

        tokio::task::spawn_blocking(move || -> StoreResult<()> {
            let bucket_dir = target
                .parent()
                .ok_or_else(|| StoreError::InvalidPath {
                    path: target.display().to_string(),
                })?;
            std::fs::create_dir_all(bucket_dir)?;

            // Atomic write: temp file in the same directory, then rename.
            let mut tmp = NamedTempFile::new_in(bucket_dir)?;
            tmp.write_all(&data)?;
            tmp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }

    async fn get(&self, path: &str) -> StoreResult<Vec<u8>> {
        let target = self.blob_path(path)?;
        tokio::fs::read(&target).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                debug!(path = %path, "blob not found");
                StoreError::NotFound {
                    path: path.to_string(),
                }
            } else {
                StoreError::Io(e)
            }
        })
    }

    async fn exists(&self, path: &str) -> StoreResult<bool> {
        let target = self.blob_path(path)?;
        Ok(tokio::fs::try_exists(&target).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> (tempfile::TempDir, FsIoStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsIoStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn blob_roundtrip() {
        let (_dir, store) = make_store();
        store.put("/io/input", b"hello world").await.unwrap();
        let got = store.get("/io/input").await.unwrap();
        assert_eq!(got, b"hello world");
    }

    #[tokio::test]
    async fn put_overwrites() {
        let (_dir, store) = make_store();
        store.put("/io/x", b"first").await.unwrap();
        store.put("/io/x", b"second").await.unwrap();
        assert_eq!(store.get("/io/x").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn layout_is_bucket_then_name() {
        let (dir, store) = make_store();
        store.put("/bucket-a/object-1", b"{}").await.unwrap();
        assert!(dir.path().join("bucket-a").join("object-1").is_file());
    }

    #[tokio::test]
    async fn get_nonexistent_returns_not_found() {
        let (_dir, store) = make_store();
        let err = store.get("/io/missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let (_dir, store) = make_store();
        let err = store.put("/../escape", b"x").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath { .. }));
    }

    #[tokio::test]
    async fn exists_tracks_puts() {
        let (_dir, store) = make_store();
        assert!(!store.exists("/io/y").await.unwrap());
        store.put("/io/y", b"").await.unwrap();
        assert!(store.exists("/io/y").await.unwrap());
    }
}
