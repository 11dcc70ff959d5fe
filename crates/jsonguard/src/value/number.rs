use core::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

/// Largest integer magnitude that an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A finite IEEE-754 double.
///
/// NaN and infinities are not representable, which makes `Number` totally ordered
/// for equality purposes and lets it implement `Eq` and `Hash`.
#[derive(Debug, Copy, Clone)]
pub struct Number(f64);

impl Number {
    /// Create a number, returning `None` for NaN or infinite values.
    #[must_use]
    pub fn new(value: f64) -> Option<Number> {
        value.is_finite().then_some(Number(value))
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Whether the number has no fractional part.
    #[must_use]
    pub fn is_integer(self) -> bool {
        self.0.fract() == 0.0
    }

    /// The value as `i64` when it is integral and exactly representable.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(self) -> Option<i64> {
        (self.is_integer() && self.0.abs() <= MAX_SAFE_INTEGER).then_some(self.0 as i64)
    }
}

impl PartialEq for Number {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, h: &mut H) {
        // `0.0 == -0.0`, so both must hash the same way
        if self.0 == 0.0 {
            0.0f64.to_bits().hash(h);
        } else {
            self.0.to_bits().hash(h);
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(integer) = self.as_i64() {
            let mut buffer = itoa::Buffer::new();
            f.write_str(buffer.format(integer))
        } else {
            match serde_json::Number::from_f64(self.0) {
                Some(number) => fmt::Display::fmt(&number, f),
                None => Err(fmt::Error),
            }
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_i64() {
            Some(integer) => serializer.serialize_i64(integer),
            None => serializer.serialize_f64(self.0),
        }
    }
}

impl From<i64> for Number {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Number(value as f64)
    }
}

impl From<u64> for Number {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: u64) -> Self {
        Number(value as f64)
    }
}

impl From<&serde_json::Number> for Number {
    fn from(value: &serde_json::Number) -> Self {
        // Always `Some` and finite unless serde_json is built with `arbitrary_precision`
        Number(
            value
                .as_f64()
                .filter(|value| value.is_finite())
                .unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Number;
    use test_case::test_case;

    #[test_case(1.0, "1")]
    #[test_case(-17.0, "-17")]
    #[test_case(1.5, "1.5")]
    #[test_case(0.1, "0.1")]
    #[test_case(1e300, "1e300")]
    fn display(value: f64, expected: &str) {
        assert_eq!(Number::new(value).expect("finite").to_string(), expected);
    }

    #[test_case(f64::NAN)]
    #[test_case(f64::INFINITY)]
    #[test_case(f64::NEG_INFINITY)]
    fn non_finite_is_rejected(value: f64) {
        assert!(Number::new(value).is_none());
    }

    #[test]
    fn signed_zeros_are_equal() {
        assert_eq!(Number::new(0.0), Number::new(-0.0));
    }
}
