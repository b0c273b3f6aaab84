//! Error types for uworker-store

use thiserror::Error;

/// Errors that can occur while moving envelope blobs
#[derive(Error, Debug)]
pub enum StoreError {
    /// No blob stored at the path
    #[error("blob not found: {path}")]
    NotFound { path: String },

    /// Path is not of the form `/<bucket>/<name>` or escapes the store root
    #[error("invalid storage path: {path}")]
    InvalidPath { path: String },

    /// Underlying filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
