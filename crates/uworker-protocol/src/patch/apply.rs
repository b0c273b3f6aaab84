//! Orchestrator-side patch application.
//!
//! This is a field-level merge: only properties named in the patch are
//! written, so a stale base snapshot cannot clobber fields the orchestrator
//! changed after dispatch. No version check happens here; callers that
//! want one use [`stale_fields`] and decide for themselves.

use serde::{Deserialize, Serialize};

use super::error::ShapeError;
use crate::domain::{Entity, EntityChange, OpaquePayload, Patch};
use crate::obs;

/// Check every patched value against the current property shapes.
pub fn check_shapes(current: &Entity, patch: &Patch) -> Result<(), ShapeError> {
    for (name, incoming) in patch.iter() {
        let Some(existing) = current.get(name) else {
            continue;
        };
        if !existing.shape().accepts(incoming.shape()) {
            return Err(ShapeError {
                entity: current.key.to_string(),
                property: name.to_string(),
                existing: existing.shape(),
                incoming: incoming.shape(),
            });
        }
    }
    Ok(())
}

/// Apply `patch` to `current` in place.
///
/// All shapes are checked first; on error `current` is left untouched.
pub fn apply_patch(current: &mut Entity, patch: &Patch) -> Result<(), ShapeError> {
    check_shapes(current, patch)?;
    for (name, value) in patch.iter() {
        current.set(name, value.clone());
    }
    Ok(())
}

/// Merge a worker's change into the orchestrator's current copy.
///
/// The caller is responsible for having looked `current` up by
/// `change.key()`.
pub fn apply_change(current: &Entity, change: &EntityChange) -> Result<Entity, ShapeError> {
    let mut merged = current.clone();
    apply_patch(&mut merged, &change.changed)?;
    obs::emit_patch_applied(&current.key, change.changed.len());
    Ok(merged)
}

/// A patched field whose current value no longer matches the worker's base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConflict {
    pub property: String,
    /// Value the worker started from.
    pub base: Option<OpaquePayload>,
    /// Value in the orchestrator's copy now.
    pub current: Option<OpaquePayload>,
    /// Value the worker wants to write.
    pub incoming: OpaquePayload,
}

/// Patched fields that something else modified since the base snapshot.
///
/// Fields outside the patch are never reported; they are untouched by
/// [`apply_change`] anyway.
pub fn stale_fields(current: &Entity, change: &EntityChange) -> Vec<FieldConflict> {
    let conflicts: Vec<FieldConflict> = change
        .changed
        .iter()
        .filter(|(name, _)| change.entity.get(name) != current.get(name))
        .map(|(name, incoming)| FieldConflict {
            property: name.to_string(),
            base: change.entity.get(name).cloned(),
            current: current.get(name).cloned(),
            incoming: incoming.clone(),
        })
        .collect();

    if !conflicts.is_empty() {
        obs::emit_stale_fields(&current.key, conflicts.len());
    }
    conflicts
}
