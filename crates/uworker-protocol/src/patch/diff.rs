//! Worker-side patch generation.

use crate::domain::{Entity, EntityChange, Patch};
use crate::obs;

/// Properties of `mutated` whose value differs from `base`.
///
/// Comparison is by value. A property set back to a zero or default value
/// is still reported when it differs from `base`. Properties present in
/// `base` but missing from `mutated` cannot be expressed as a patch and are
/// left out.
///
/// # Panics
///
/// Panics if `base` and `mutated` describe different entities; diffing
/// across identities is a caller bug, not a protocol condition.
pub fn diff_properties(base: &Entity, mutated: &Entity) -> Patch {
    assert_eq!(
        base.key, mutated.key,
        "diff requires snapshots of the same entity"
    );

    let patch: Patch = mutated
        .properties
        .iter()
        .filter(|(name, value)| base.get(name) != Some(*value))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let dropped = base
        .properties
        .keys()
        .filter(|name| !mutated.has(name))
        .count();
    if dropped > 0 {
        obs::emit_removed_properties_ignored(&base.key, dropped);
    }

    patch
}

/// Build the change wrapper a worker reports for one entity.
pub fn diff_entity(base: &Entity, mutated: &Entity) -> EntityChange {
    let changed = diff_properties(base, mutated);
    obs::emit_patch_generated(&base.key, changed.len());
    EntityChange::new(base.clone(), changed)
}
