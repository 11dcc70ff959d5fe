//! Immutable JSON document model.
mod number;
mod object;
mod parse;

use core::fmt;
use std::hash::{Hash, Hasher};

use ahash::RandomState;
use serde::{Serialize, Serializer};

pub use number::Number;
pub use object::Object;
pub use parse::{parse, parse_str, ParseError};

use crate::types::JsonType;

/// A parsed JSON value.
///
/// Equality is structural: arrays compare element by element, objects compare as maps regardless
/// of key order, and numbers compare by value (`1` equals `1.0`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<JsonValue>),
    Object(Object),
}

impl JsonValue {
    #[must_use]
    pub fn json_type(&self) -> JsonType {
        match self {
            JsonValue::Null => JsonType::Null,
            JsonValue::Bool(_) => JsonType::Boolean,
            JsonValue::Number(_) => JsonType::Number,
            JsonValue::String(_) => JsonType::String,
            JsonValue::Array(_) => JsonType::Array,
            JsonValue::Object(_) => JsonType::Object,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        match self {
            JsonValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            JsonValue::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Look up a property of an object value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_object().and_then(|object| object.get(key))
    }

    /// Resolve a JSON Pointer (RFC 6901) against this value.
    ///
    /// The pointer is expected in its escaped form (`~0` for `~`, `~1` for `/`).
    #[must_use]
    pub fn pointer(&self, pointer: &str) -> Option<&JsonValue> {
        if pointer.is_empty() {
            return Some(self);
        }
        let pointer = pointer.strip_prefix('/')?;
        let mut target = self;
        for token in pointer.split('/') {
            let token = unescape(token);
            target = match target {
                JsonValue::Object(object) => object.get(&token)?,
                JsonValue::Array(items) => items.get(parse_index(&token)?)?,
                _ => return None,
            };
        }
        Some(target)
    }
}

fn unescape(token: &str) -> std::borrow::Cow<'_, str> {
    if token.contains('~') {
        std::borrow::Cow::Owned(token.replace("~1", "/").replace("~0", "~"))
    } else {
        std::borrow::Cow::Borrowed(token)
    }
}

fn parse_index(token: &str) -> Option<usize> {
    if token.starts_with('+') || (token.starts_with('0') && token.len() > 1) {
        return None;
    }
    token.parse().ok()
}

impl Hash for JsonValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            JsonValue::Null => {}
            JsonValue::Bool(value) => value.hash(state),
            JsonValue::Number(value) => value.hash(state),
            JsonValue::String(value) => value.hash(state),
            JsonValue::Array(items) => items.hash(state),
            JsonValue::Object(object) => {
                // Key order does not participate in equality, so entries are combined with a
                // commutative operation.
                let hasher = RandomState::with_seeds(0, 0, 0, 0);
                let mut combined = 0u64;
                for (key, value) in object.iter() {
                    combined = combined.wrapping_add(hasher.hash_one((key, value)));
                }
                object.len().hash(state);
                combined.hash(state);
            }
        }
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let serialized = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&serialized)
    }
}

impl Serialize for JsonValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JsonValue::Null => serializer.serialize_unit(),
            JsonValue::Bool(value) => serializer.serialize_bool(*value),
            JsonValue::Number(value) => value.serialize(serializer),
            JsonValue::String(value) => serializer.serialize_str(value),
            JsonValue::Array(items) => serializer.collect_seq(items),
            JsonValue::Object(object) => serializer.collect_map(object.iter()),
        }
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(value) => JsonValue::Bool(value),
            serde_json::Value::Number(value) => JsonValue::Number(Number::from(&value)),
            serde_json::Value::String(value) => JsonValue::String(value),
            serde_json::Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            serde_json::Value::Object(object) => JsonValue::Object(
                object
                    .into_iter()
                    .map(|(key, value)| (key, JsonValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&serde_json::Value> for JsonValue {
    fn from(value: &serde_json::Value) -> Self {
        JsonValue::from(value.clone())
    }
}

impl From<bool> for JsonValue {
    fn from(value: bool) -> Self {
        JsonValue::Bool(value)
    }
}

impl From<i32> for JsonValue {
    fn from(value: i32) -> Self {
        JsonValue::Number(Number::from(i64::from(value)))
    }
}

impl From<i64> for JsonValue {
    fn from(value: i64) -> Self {
        JsonValue::Number(Number::from(value))
    }
}

impl From<u64> for JsonValue {
    fn from(value: u64) -> Self {
        JsonValue::Number(Number::from(value))
    }
}

impl From<Number> for JsonValue {
    fn from(value: Number) -> Self {
        JsonValue::Number(value)
    }
}

impl From<&str> for JsonValue {
    fn from(value: &str) -> Self {
        JsonValue::String(value.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(value: String) -> Self {
        JsonValue::String(value)
    }
}

impl From<Vec<JsonValue>> for JsonValue {
    fn from(value: Vec<JsonValue>) -> Self {
        JsonValue::Array(value)
    }
}

impl From<Object> for JsonValue {
    fn from(value: Object) -> Self {
        JsonValue::Object(value)
    }
}

impl FromIterator<JsonValue> for JsonValue {
    fn from_iter<T: IntoIterator<Item = JsonValue>>(iter: T) -> Self {
        JsonValue::Array(iter.into_iter().collect())
    }
}
