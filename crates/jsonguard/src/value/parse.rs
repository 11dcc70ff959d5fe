use core::fmt;

use serde::{
    de::{self, MapAccess, SeqAccess, Visitor},
    Deserialize, Deserializer,
};

use super::{JsonValue, Number, Object};

/// Malformed JSON text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason} at offset {offset}")]
pub struct ParseError {
    offset: usize,
    reason: String,
}

impl ParseError {
    /// Byte offset in the input where parsing stopped.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    fn from_serde(input: &[u8], error: &serde_json::Error) -> ParseError {
        let rendered = error.to_string();
        let suffix = format!(" at line {} column {}", error.line(), error.column());
        let reason = rendered
            .strip_suffix(&suffix)
            .unwrap_or(&rendered)
            .to_string();
        ParseError {
            offset: byte_offset(input, error.line(), error.column()),
            reason,
        }
    }
}

/// Convert serde_json's 1-based line and byte column into an absolute byte offset.
fn byte_offset(input: &[u8], line: usize, column: usize) -> usize {
    if line <= 1 {
        return column.min(input.len());
    }
    let line_start = input
        .iter()
        .enumerate()
        .filter(|(_, byte)| **byte == b'\n')
        .nth(line - 2)
        .map_or(0, |(idx, _)| idx + 1);
    (line_start + column).min(input.len())
}

/// Parse JSON bytes into a [`JsonValue`].
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not valid JSON, including numbers that do not fit
/// into a finite `f64`.
pub fn parse(bytes: &[u8]) -> Result<JsonValue, ParseError> {
    serde_json::from_slice(bytes).map_err(|error| ParseError::from_serde(bytes, &error))
}

/// Parse JSON text into a [`JsonValue`].
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not valid JSON.
pub fn parse_str(text: &str) -> Result<JsonValue, ParseError> {
    parse(text.as_bytes())
}

struct JsonValueVisitor;

impl<'de> Visitor<'de> for JsonValueVisitor {
    type Value = JsonValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any valid JSON value")
    }

    fn visit_bool<E>(self, value: bool) -> Result<JsonValue, E> {
        Ok(JsonValue::Bool(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<JsonValue, E> {
        Ok(JsonValue::Number(Number::from(value)))
    }

    fn visit_u64<E>(self, value: u64) -> Result<JsonValue, E> {
        Ok(JsonValue::Number(Number::from(value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<JsonValue, E> {
        Number::new(value)
            .map(JsonValue::Number)
            .ok_or_else(|| E::custom("non-finite number"))
    }

    fn visit_str<E>(self, value: &str) -> Result<JsonValue, E> {
        Ok(JsonValue::String(value.to_string()))
    }

    fn visit_string<E>(self, value: String) -> Result<JsonValue, E> {
        Ok(JsonValue::String(value))
    }

    fn visit_unit<E>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_none<E>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<JsonValue, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<JsonValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(JsonValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<JsonValue, A::Error> {
        let mut object = Object::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, JsonValue>()? {
            object.insert(key, value);
        }
        Ok(JsonValue::Object(object))
    }
}

impl<'de> Deserialize<'de> for JsonValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<JsonValue, D::Error> {
        deserializer.deserialize_any(JsonValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::{parse, parse_str};
    use crate::JsonValue;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn preserves_key_order() {
        let value = parse_str(r#"{"z": 1, "a": {"y": [], "b": null}}"#).expect("Valid JSON");
        let object = value.as_object().expect("Object");
        assert_eq!(object.keys().collect::<Vec<_>>(), ["z", "a"]);
        let nested = object.get("a").and_then(JsonValue::as_object).expect("Object");
        assert_eq!(nested.keys().collect::<Vec<_>>(), ["y", "b"]);
    }

    #[test]
    fn duplicate_keys_keep_last_value() {
        let value = parse_str(r#"{"a": 1, "b": 2, "a": 3}"#).expect("Valid JSON");
        assert_eq!(value, JsonValue::from(json!({"a": 3, "b": 2})));
    }

    #[test]
    fn numbers_are_doubles() {
        let value = parse_str("[1, -2, 2.5, 1e2, 18446744073709551615]").expect("Valid JSON");
        let numbers: Vec<f64> = value
            .as_array()
            .expect("Array")
            .iter()
            .filter_map(JsonValue::as_f64)
            .collect();
        assert_eq!(numbers, [1.0, -2.0, 2.5, 100.0, 18_446_744_073_709_551_615.0]);
    }

    #[test_case(""; "empty input")]
    #[test_case("{"; "unterminated object")]
    #[test_case("[1, 2,]"; "trailing comma")]
    #[test_case("{\n  \"a\": tru\n}"; "bad literal on second line")]
    #[test_case("NaN"; "nan")]
    #[test_case("1e400"; "out of range")]
    fn rejects_malformed_input(input: &str) {
        let error = parse(input.as_bytes()).expect_err("Invalid JSON");
        assert!(error.offset() <= input.len(), "{error}");
        assert!(!error.reason().is_empty());
        assert!(!error.reason().contains(" at line "), "{error}");
    }

    #[test]
    fn offset_points_into_later_lines() {
        let input = "{\n  \"a\": 1,\n  \"b\": tru\n}";
        let error = parse_str(input).expect_err("Invalid JSON");
        let second_line_start = input.find("  \"b\"").expect("present");
        assert!(error.offset() > second_line_start, "{error}");
    }
}
