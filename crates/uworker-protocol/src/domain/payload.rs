//! Opaque payload: schema-less structured values.
//!
//! Used for the task environment map and for the values carried in patches.
//! The layer never interprets the content; it only needs to round-trip it
//! and to compare its shape against an existing property.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A closed tagged value. Serializes as the plain JSON equivalent.
///
/// Variant order matters for decoding: integers are tried before floats so
/// that `3` stays an `Int` and `3.0` stays a `Float`.
///
/// Equality treats two NaN floats as equal, so an untouched NaN property
/// never shows up in a diff.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpaquePayload {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<OpaquePayload>),
    Map(BTreeMap<String, OpaquePayload>),
}

impl PartialEq for OpaquePayload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OpaquePayload::Null, OpaquePayload::Null) => true,
            (OpaquePayload::Bool(a), OpaquePayload::Bool(b)) => a == b,
            (OpaquePayload::Int(a), OpaquePayload::Int(b)) => a == b,
            (OpaquePayload::Float(a), OpaquePayload::Float(b)) => {
                a == b || (a.is_nan() && b.is_nan())
            }
            (OpaquePayload::String(a), OpaquePayload::String(b)) => a == b,
            (OpaquePayload::List(a), OpaquePayload::List(b)) => a == b,
            (OpaquePayload::Map(a), OpaquePayload::Map(b)) => a == b,
            _ => false,
        }
    }
}

/// Coarse shape of a payload, used for patch compatibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadShape {
    Null,
    Bool,
    Number,
    String,
    List,
    Map,
}

impl PayloadShape {
    /// Whether a value of shape `incoming` may replace a value of shape `self`.
    ///
    /// `Null` is compatible in both directions; integers and floats share
    /// the `Number` shape.
    pub fn accepts(self, incoming: PayloadShape) -> bool {
        self == PayloadShape::Null || incoming == PayloadShape::Null || self == incoming
    }
}

impl fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PayloadShape::Null => "null",
            PayloadShape::Bool => "bool",
            PayloadShape::Number => "number",
            PayloadShape::String => "string",
            PayloadShape::List => "list",
            PayloadShape::Map => "map",
        };
        f.write_str(s)
    }
}

impl OpaquePayload {
    pub fn shape(&self) -> PayloadShape {
        match self {
            OpaquePayload::Null => PayloadShape::Null,
            OpaquePayload::Bool(_) => PayloadShape::Bool,
            OpaquePayload::Int(_) | OpaquePayload::Float(_) => PayloadShape::Number,
            OpaquePayload::String(_) => PayloadShape::String,
            OpaquePayload::List(_) => PayloadShape::List,
            OpaquePayload::Map(_) => PayloadShape::Map,
        }
    }

    /// False if any float in the payload is NaN or infinite. JSON has no
    /// encoding for those values.
    pub fn is_finite(&self) -> bool {
        match self {
            OpaquePayload::Float(f) => f.is_finite(),
            OpaquePayload::List(items) => items.iter().all(OpaquePayload::is_finite),
            OpaquePayload::Map(m) => m.values().all(OpaquePayload::is_finite),
            _ => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, OpaquePayload::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OpaquePayload::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, OpaquePayload>> {
        match self {
            OpaquePayload::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a key when this payload is a map.
    pub fn get(&self, key: &str) -> Option<&OpaquePayload> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Build a string-keyed map payload, e.g. for a task environment.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<OpaquePayload>,
        I: IntoIterator<Item = (K, V)>,
    {
        OpaquePayload::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<bool> for OpaquePayload {
    fn from(v: bool) -> Self {
        OpaquePayload::Bool(v)
    }
}

impl From<i64> for OpaquePayload {
    fn from(v: i64) -> Self {
        OpaquePayload::Int(v)
    }
}

impl From<i32> for OpaquePayload {
    fn from(v: i32) -> Self {
        OpaquePayload::Int(i64::from(v))
    }
}

impl From<f64> for OpaquePayload {
    fn from(v: f64) -> Self {
        OpaquePayload::Float(v)
    }
}

impl From<&str> for OpaquePayload {
    fn from(v: &str) -> Self {
        OpaquePayload::String(v.to_string())
    }
}

impl From<String> for OpaquePayload {
    fn from(v: String) -> Self {
        OpaquePayload::String(v)
    }
}

impl<T: Into<OpaquePayload>> From<Vec<T>> for OpaquePayload {
    fn from(v: Vec<T>) -> Self {
        OpaquePayload::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for OpaquePayload {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => OpaquePayload::Null,
            Value::Bool(b) => OpaquePayload::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => OpaquePayload::Int(i),
                None => OpaquePayload::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => OpaquePayload::String(s),
            Value::Array(items) => OpaquePayload::List(items.into_iter().map(Into::into).collect()),
            Value::Object(obj) => {
                OpaquePayload::Map(obj.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<OpaquePayload> for serde_json::Value {
    fn from(p: OpaquePayload) -> Self {
        use serde_json::Value;
        match p {
            OpaquePayload::Null => Value::Null,
            OpaquePayload::Bool(b) => Value::Bool(b),
            OpaquePayload::Int(i) => Value::from(i),
            OpaquePayload::Float(f) => Value::from(f),
            OpaquePayload::String(s) => Value::String(s),
            OpaquePayload::List(items) => Value::Array(items.into_iter().map(Into::into).collect()),
            OpaquePayload::Map(m) => Value::Object(m.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}
