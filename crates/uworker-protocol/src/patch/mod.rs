//! Patch-based result merging.
//!
//! - `diff`: worker builds a patch from its base snapshot and working copy
//! - `tracked`: worker-side wrapper recording every property write
//! - `apply`: orchestrator merges a change into its current copy

pub mod apply;
pub mod diff;
mod error;
pub mod tracked;

pub use apply::{apply_change, apply_patch, check_shapes, stale_fields, FieldConflict};
pub use diff::{diff_entity, diff_properties};
pub use error::ShapeError;
pub use tracked::TrackedEntity;
