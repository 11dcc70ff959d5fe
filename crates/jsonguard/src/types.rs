use core::fmt;
use std::str::FromStr;

use crate::value::JsonValue;

/// Primitive types of the JSON Schema `type` keyword.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum JsonType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl JsonType {
    const ALL: [JsonType; 7] = [
        JsonType::Array,
        JsonType::Boolean,
        JsonType::Integer,
        JsonType::Null,
        JsonType::Number,
        JsonType::Object,
        JsonType::String,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::Array => "array",
            JsonType::Boolean => "boolean",
            JsonType::Integer => "integer",
            JsonType::Null => "null",
            JsonType::Number => "number",
            JsonType::Object => "object",
            JsonType::String => "string",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JsonType {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "array" => Ok(JsonType::Array),
            "boolean" => Ok(JsonType::Boolean),
            "integer" => Ok(JsonType::Integer),
            "null" => Ok(JsonType::Null),
            "number" => Ok(JsonType::Number),
            "object" => Ok(JsonType::Object),
            "string" => Ok(JsonType::String),
            _ => Err(()),
        }
    }
}

/// A compact set of [`JsonType`] values.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonTypeSet(u8);

impl JsonTypeSet {
    #[must_use]
    pub const fn empty() -> Self {
        JsonTypeSet(0)
    }

    #[must_use]
    pub fn insert(self, ty: JsonType) -> Self {
        JsonTypeSet(self.0 | ty.bit())
    }

    #[must_use]
    pub fn contains(self, ty: JsonType) -> bool {
        self.0 & ty.bit() != 0
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether `instance` belongs to one of the types in the set.
    ///
    /// Numbers without a fractional part satisfy `integer`.
    #[must_use]
    pub fn contains_value_type(self, instance: &JsonValue) -> bool {
        match instance {
            JsonValue::Number(number) => {
                self.contains(JsonType::Number)
                    || (self.contains(JsonType::Integer) && number.is_integer())
            }
            _ => self.contains(instance.json_type()),
        }
    }

    pub fn iter(self) -> impl Iterator<Item = JsonType> {
        JsonType::ALL.into_iter().filter(move |ty| self.contains(*ty))
    }
}

impl FromIterator<JsonType> for JsonTypeSet {
    fn from_iter<T: IntoIterator<Item = JsonType>>(iter: T) -> Self {
        iter.into_iter().fold(JsonTypeSet::empty(), JsonTypeSet::insert)
    }
}

impl fmt::Debug for JsonTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonType, JsonTypeSet};
    use crate::JsonValue;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!(1), true)]
    #[test_case(json!(1.0), true)]
    #[test_case(json!(1.5), false)]
    #[test_case(json!("1"), false)]
    fn integer_membership(instance: serde_json::Value, expected: bool) {
        let set = JsonTypeSet::empty().insert(JsonType::Integer);
        assert_eq!(set.contains_value_type(&JsonValue::from(instance)), expected);
    }

    #[test]
    fn iteration_order_is_stable() {
        let set: JsonTypeSet = [JsonType::String, JsonType::Null, JsonType::Array]
            .into_iter()
            .collect();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            [JsonType::Array, JsonType::Null, JsonType::String]
        );
        assert_eq!(set.len(), 3);
    }
}
