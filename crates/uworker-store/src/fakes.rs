//! In-memory fake for the storage trait
//!
//! `MemoryIoStore` satisfies the `IoStore` contract without touching the
//! filesystem or the network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::storage_traits::{split_path, IoStore, StoreResult};

/// In-memory blob store backed by a `HashMap<path, bytes>`.
#[derive(Debug, Default)]
pub struct MemoryIoStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryIoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IoStore for MemoryIoStore {
    async fn put(&self, path: &str, data: &[u8]) -> StoreResult<()> {
        split_path(path)?;
        let mut blobs = self.blobs.lock().unwrap();
        blobs.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    async fn get(&self, path: &str) -> StoreResult<Vec<u8>> {
        split_path(path)?;
        let blobs = self.blobs.lock().unwrap();
        blobs
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })
    }

    async fn exists(&self, path: &str) -> StoreResult<bool> {
        split_path(path)?;
        let blobs = self.blobs.lock().unwrap();
        Ok(blobs.contains_key(path))
    }
}
