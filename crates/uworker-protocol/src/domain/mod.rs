//! Domain models for the uworker protocol.
//!
//! - `OpaquePayload`: schema-less values for environments and patches
//! - `Entity`: identity-bearing store records
//! - `EntityChange`: base snapshot + patch reported by a worker
//! - `ErrorType`: the closed failure taxonomy

pub mod change;
pub mod entity;
pub mod error_type;
pub mod payload;

pub use change::{EntityChange, Patch};
pub use entity::{Entity, EntityKey};
pub use error_type::ErrorType;
pub use payload::{OpaquePayload, PayloadShape};
