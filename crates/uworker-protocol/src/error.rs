//! Protocol-level error taxonomy.
//!
//! Worker failures are *not* errors here: they travel as data in
//! `UworkerOutput::error`. These are the failures of the protocol itself.

use crate::codec::DecodeError;
use crate::patch::ShapeError;
use crate::validation::ValidationError;

/// Errors produced by the uworker protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Store(#[from] uworker_store::StoreError),

    #[error("uuid collision found for I/O path {path}")]
    PathCollision { path: String },

    #[error("input field {field} is already set")]
    FieldAlreadySet { field: &'static str },

    #[error("{kind} envelope holds a NaN or infinite float")]
    NonFiniteFloat { kind: &'static str },

    #[error("input has no output upload url")]
    MissingOutputUploadUrl,

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Task(#[from] anyhow::Error),
}

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_error_names_path() {
        let err = ProtocolError::PathCollision {
            path: "/uworker-io/abc".to_string(),
        };
        assert!(err.to_string().contains("/uworker-io/abc"));
    }

    #[test]
    fn field_already_set_display() {
        let err = ProtocolError::FieldAlreadySet { field: "job_type" };
        assert_eq!(err.to_string(), "input field job_type is already set");
    }

    #[test]
    fn non_finite_display_names_envelope() {
        let err = ProtocolError::NonFiniteFloat { kind: "input" };
        assert_eq!(err.to_string(), "input envelope holds a NaN or infinite float");
    }

    #[test]
    fn task_errors_are_transparent() {
        let err = ProtocolError::from(anyhow::anyhow!("fuzzer crashed"));
        assert_eq!(err.to_string(), "fuzzer crashed");
    }
}
