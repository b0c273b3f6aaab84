//! Change-tracking wrapper used on the worker.
//!
//! Reads go to the working copy. Every `set` is recorded, even when the new
//! value equals the old one, so the trusted side can write back exactly the
//! fields the task touched instead of clobbering the whole entity.

use crate::domain::{Entity, EntityChange, EntityKey, OpaquePayload, Patch};

use super::diff::diff_entity;

#[derive(Debug, Clone)]
pub struct TrackedEntity {
    base: Entity,
    working: Entity,
    changed: Patch,
}

impl TrackedEntity {
    pub fn new(entity: Entity) -> Self {
        Self {
            working: entity.clone(),
            base: entity,
            changed: Patch::new(),
        }
    }

    pub fn key(&self) -> &EntityKey {
        &self.working.key
    }

    /// Current value of a property. `None` if the entity never had it.
    pub fn get(&self, name: &str) -> Option<&OpaquePayload> {
        self.working.get(name)
    }

    /// Set a property and record it as changed.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<OpaquePayload>) {
        let name = name.into();
        let value = value.into();
        self.changed.insert(name.clone(), value.clone());
        self.working.set(name, value);
    }

    /// Properties set so far.
    pub fn changed(&self) -> &Patch {
        &self.changed
    }

    pub fn base(&self) -> &Entity {
        &self.base
    }

    pub fn working(&self) -> &Entity {
        &self.working
    }

    /// Change wrapper with every recorded `set`.
    pub fn into_change(self) -> EntityChange {
        EntityChange::new(self.base, self.changed)
    }

    /// Change wrapper with only the values that actually differ from the
    /// base snapshot.
    pub fn into_minimal_change(self) -> EntityChange {
        diff_entity(&self.base, &self.working)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALUE: i64 = 1;
    const NEW_VALUE: i64 = 2;

    fn wrapped() -> TrackedEntity {
        TrackedEntity::new(Entity::new(EntityKey::new("Testcase", "1")).with("a", VALUE))
    }

    #[test]
    fn reflects_underlying() {
        assert_eq!(wrapped().get("a"), Some(&OpaquePayload::Int(VALUE)));
    }

    #[test]
    fn modifies_working_copy() {
        let mut w = wrapped();
        w.set("a", NEW_VALUE);
        w.set("b", NEW_VALUE);
        assert_eq!(w.get("a"), Some(&OpaquePayload::Int(NEW_VALUE)));
        assert_eq!(w.get("b"), Some(&OpaquePayload::Int(NEW_VALUE)));
        assert_eq!(w.base().get("a"), Some(&OpaquePayload::Int(VALUE)));
    }

    #[test]
    fn no_changes_when_only_read() {
        let w = wrapped();
        let _ = w.get("a");
        assert!(w.changed().is_empty());
    }

    #[test]
    fn tracks_sets_even_without_value_change() {
        let mut w = wrapped();
        w.set("a", VALUE);
        w.set("b", VALUE);
        w.set("c", VALUE);
        let expected = Patch::new().with("a", VALUE).with("b", VALUE).with("c", VALUE);
        assert_eq!(w.changed(), &expected);
    }

    #[test]
    fn missing_properties_read_as_none() {
        let w = wrapped();
        assert!(w.get("nonexistent").is_none());
    }

    #[test]
    fn minimal_change_drops_same_value_sets() {
        let mut w = wrapped();
        w.set("a", VALUE);
        w.set("b", NEW_VALUE);
        let change = w.into_minimal_change();
        assert_eq!(change.changed, Patch::new().with("b", NEW_VALUE));
    }

    #[test]
    fn into_change_keeps_base_snapshot() {
        let mut w = wrapped();
        w.set("a", NEW_VALUE);
        let change = w.into_change();
        assert_eq!(change.entity.get("a"), Some(&OpaquePayload::Int(VALUE)));
        assert_eq!(change.changed.get("a"), Some(&OpaquePayload::Int(NEW_VALUE)));
    }
}
