//! uworker Protocol Library
//!
//! Wire contract for offloading one task from a trusted orchestrator to an
//! untrusted worker, and for merging the worker's results back without
//! clobbering concurrent changes:
//! - `UworkerInput` / `UworkerOutput`: the task envelopes
//! - `EntityChange`: base snapshot + patch of changed fields
//! - `ErrorType`: closed failure taxonomy carried as data
//! - `diff_entity` / `apply_change`: worker-side diff, orchestrator-side merge
//! - `validate_output`: rejects outputs that contradict their error type

pub mod codec;
pub mod config;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod obs;
pub mod patch;
pub mod task;
pub mod telemetry;
pub mod validation;

pub use codec::{
    decode, decode_input, decode_output, digest, encode, encode_input, encode_output,
    DecodeError, Envelope,
};
pub use config::{IoConfig, LogFormat};
pub use domain::{Entity, EntityChange, EntityKey, ErrorType, OpaquePayload, Patch, PayloadShape};
pub use envelope::{UworkerInput, UworkerOutput};
pub use error::{ProtocolError, Result};
pub use obs::TaskSpan;
pub use patch::{
    apply_change, apply_patch, check_shapes, diff_entity, diff_properties, stale_fields,
    FieldConflict, ShapeError, TrackedEntity,
};
pub use task::{
    execution_mode, is_trusted_portion_of_utask, utask_trusted_portions, ExecutionMode,
    LocalExecutor, PreprocessResult, StoredExecutor, UTask,
};
pub use telemetry::init_tracing;
pub use validation::{validate_output, ValidationError};

/// uworker protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
