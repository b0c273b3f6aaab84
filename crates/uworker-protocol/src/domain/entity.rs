//! Entity snapshots exchanged through the envelopes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::payload::OpaquePayload;

/// Identity of a stored entity: its kind (model name) plus an opaque id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: String,
    pub id: String,
}

impl EntityKey {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// An identity-bearing record: key plus named properties.
///
/// Property semantics are not interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub key: EntityKey,
    #[serde(default)]
    pub properties: BTreeMap<String, OpaquePayload>,
}

impl Entity {
    pub fn new(key: EntityKey) -> Self {
        Self {
            key,
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OpaquePayload>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&OpaquePayload> {
        self.properties.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<OpaquePayload>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn is_finite(&self) -> bool {
        self.properties.values().all(OpaquePayload::is_finite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_wire_shape() {
        let e = Entity::new(EntityKey::new("Testcase", "42")).with("status", "pending");
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(
            v,
            json!({"key": {"kind": "Testcase", "id": "42"}, "properties": {"status": "pending"}})
        );
    }

    #[test]
    fn missing_properties_decode_as_empty() {
        let e: Entity = serde_json::from_value(json!({"key": {"kind": "Job", "id": "j"}})).unwrap();
        assert!(e.properties.is_empty());
    }

    #[test]
    fn key_display() {
        assert_eq!(EntityKey::new("Testcase", "7").to_string(), "Testcase/7");
    }
}
