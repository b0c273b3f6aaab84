//! Storage trait definitions for uworker I/O
//!
//! A storage path is `/<bucket>/<name>`: a leading slash, a bucket segment
//! and a single object name. Implementations are expected to treat the path
//! as an opaque key once it has been validated.

use async_trait::async_trait;

use crate::error::StoreError;

/// Result type for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Blob store used to hand envelopes across the trust boundary.
///
/// Guarantees:
/// - `get(path)` returns the exact bytes last `put` at `path`.
/// - `put` overwrites any previous blob at the same path.
#[async_trait]
pub trait IoStore: Send + Sync {
    /// Store bytes at `path`.
    async fn put(&self, path: &str, data: &[u8]) -> StoreResult<()>;

    /// Retrieve bytes from `path`. Returns `StoreError::NotFound` if absent.
    async fn get(&self, path: &str) -> StoreResult<Vec<u8>>;

    /// Check whether a blob exists at `path`.
    async fn exists(&self, path: &str) -> StoreResult<bool>;
}

/// Split a storage path into `(bucket, name)`.
pub fn split_path(path: &str) -> StoreResult<(&str, &str)> {
    let invalid = || StoreError::InvalidPath {
        path: path.to_string(),
    };

    let rest = path.strip_prefix('/').ok_or_else(invalid)?;
    let (bucket, name) = rest.split_once('/').ok_or_else(invalid)?;

    let bad_segment = |s: &str| s.is_empty() || s == "." || s == ".." || s.contains('/');
    if bad_segment(bucket) || bad_segment(name) {
        return Err(invalid());
    }

    Ok((bucket, name))
}
