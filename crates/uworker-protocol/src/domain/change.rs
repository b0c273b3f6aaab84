//! Entity change wrappers: a base snapshot plus the fields that changed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKey};
use super::payload::OpaquePayload;

/// Top-level property changes. A key present means "changed to this value";
/// a key absent means "unchanged".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch(BTreeMap<String, OpaquePayload>);

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<OpaquePayload>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<OpaquePayload>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&OpaquePayload> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Patched property names in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OpaquePayload)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_finite(&self) -> bool {
        self.0.values().all(OpaquePayload::is_finite)
    }
}

impl FromIterator<(String, OpaquePayload)> for Patch {
    fn from_iter<I: IntoIterator<Item = (String, OpaquePayload)>>(iter: I) -> Self {
        Patch(iter.into_iter().collect())
    }
}

/// The base snapshot the worker started from plus its patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityChange {
    pub entity: Entity,
    #[serde(default)]
    pub changed: Patch,
}

impl EntityChange {
    pub fn new(entity: Entity, changed: Patch) -> Self {
        Self { entity, changed }
    }

    pub fn is_finite(&self) -> bool {
        self.entity.is_finite() && self.changed.is_finite()
    }

    /// A change that reports nothing; applying it is a no-op.
    pub fn unchanged(entity: Entity) -> Self {
        Self::new(entity, Patch::new())
    }

    /// Identity the orchestrator must look up before applying.
    pub fn key(&self) -> &EntityKey {
        &self.entity.key
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}
