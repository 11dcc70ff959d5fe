//! A JSON Schema validation engine for Drafts 4, 6 and 7.
//!
//! Schemas are compiled once into a [`Validator`] and then applied to any number of instances.
//! Validation never fails as a call: every violated constraint becomes a [`ValidationError`]
//! inside a [`ValidationResult`], in schema order.
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use jsonguard::JsonValue;
//!
//! let schema = jsonguard::parse_str(
//!     r#"{"type": "object", "properties": {"age": {"type": "integer"}}, "required": ["age"]}"#,
//! )?;
//! let validator = jsonguard::validator_for(&schema)?;
//!
//! let instance = jsonguard::parse_str(r#"{"name": "Alice"}"#)?;
//! let result = validator.validate(&instance);
//! assert!(!result.is_valid());
//! assert_eq!(result.errors()[0].to_string(), r#""age" is a required property"#);
//! assert_eq!(result.errors()[0].schema_path().as_str(), "/required");
//!
//! assert!(validator.is_valid(&JsonValue::from(serde_json::json!({"age": 30}))));
//! # Ok(())
//! # }
//! ```
//!
//! # References
//!
//! `$ref` is resolved against the schema document itself, resources registered with
//! [`ValidationOptions::with_resource`], and documents loaded by a [`Retrieve`] implementation.
//! Recursive references are supported.
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use jsonguard::JsonValue;
//! use serde_json::json;
//!
//! let schema = JsonValue::from(json!({
//!     "properties": {"child": {"$ref": "#"}},
//!     "additionalProperties": false
//! }));
//! let validator = jsonguard::validator_for(&schema)?;
//! assert!(validator.is_valid(&JsonValue::from(json!({"child": {"child": {}}}))));
//! assert!(!validator.is_valid(&JsonValue::from(json!({"child": {"other": 1}}))));
//! # Ok(())
//! # }
//! ```
mod compiler;
mod draft;
mod error;
mod evaluator;
mod node;
mod options;
mod output;
mod paths;
mod regex;
mod retriever;
mod types;
mod validator;
pub mod value;

pub use draft::Draft;
pub use error::{SchemaError, TypeKind, ValidationError, ValidationErrorKind};
pub use options::{PatternOptions, ValidationOptions};
pub use output::ValidationResult;
pub use paths::{Location, LocationSegment};
pub use retriever::Retrieve;
pub use types::{JsonType, JsonTypeSet};
pub use url::Url;
pub use validator::Validator;
pub use value::{parse, parse_str, JsonValue, Number, Object, ParseError};

/// Either of the two ways validating JSON text can fail before producing a result.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Compile `schema` into a [`Validator`] using default options.
///
/// # Errors
///
/// Returns [`SchemaError`] if the schema is malformed or one of its references can not be
/// resolved.
pub fn validator_for(schema: &JsonValue) -> Result<Validator, SchemaError> {
    Validator::new(schema)
}

/// Options for configuring how a validator is built.
#[must_use]
pub fn options() -> ValidationOptions {
    Validator::options()
}

/// One-off check of `instance` against `schema`.
///
/// # Panics
///
/// Panics if `schema` can not be compiled.
#[must_use]
pub fn is_valid(schema: &JsonValue, instance: &JsonValue) -> bool {
    validator_for(schema)
        .expect("Invalid schema")
        .is_valid(instance)
}

/// Parse both documents, compile the schema, and validate.
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed JSON text and [`Error::Schema`] if the schema can not
/// be compiled.
pub fn validate_text(schema: &str, instance: &str) -> Result<ValidationResult<'static>, Error> {
    let schema = parse_str(schema)?;
    let instance = parse_str(instance)?;
    let validator = validator_for(&schema)?;
    Ok(validator.validate(&instance).into_owned())
}

#[cfg(test)]
pub(crate) mod tests_util {
    use crate::{Draft, JsonValue, ValidationError, Validator};

    fn validator(schema: &serde_json::Value) -> Validator {
        crate::validator_for(&JsonValue::from(schema)).expect("Invalid schema")
    }

    pub(crate) fn draft4_validator(schema: &serde_json::Value) -> Validator {
        crate::options()
            .with_draft(Draft::Draft4)
            .build(&JsonValue::from(schema))
            .expect("Invalid schema")
    }

    #[track_caller]
    pub(crate) fn is_valid(schema: &serde_json::Value, instance: &serde_json::Value) {
        let validator = validator(schema);
        let instance = JsonValue::from(instance);
        let result = validator.validate(&instance);
        assert!(
            result.is_valid(),
            "{instance} should be valid (via validate). Errors: {:?}",
            result.errors()
        );
        assert!(
            validator.is_valid(&instance),
            "{instance} should be valid (via is_valid)"
        );
    }

    #[track_caller]
    pub(crate) fn is_not_valid(schema: &serde_json::Value, instance: &serde_json::Value) {
        let validator = validator(schema);
        let instance = JsonValue::from(instance);
        assert!(
            !validator.validate(&instance).is_valid(),
            "{instance} should not be valid (via validate)"
        );
        assert!(
            !validator.is_valid(&instance),
            "{instance} should not be valid (via is_valid)"
        );
    }

    pub(crate) fn errors(
        schema: &serde_json::Value,
        instance: &serde_json::Value,
    ) -> Vec<ValidationError<'static>> {
        let instance = JsonValue::from(instance);
        validator(schema)
            .validate(&instance)
            .into_owned()
            .into_errors()
    }

    #[track_caller]
    pub(crate) fn single_error(
        schema: &serde_json::Value,
        instance: &serde_json::Value,
    ) -> ValidationError<'static> {
        let mut errors = errors(schema, instance);
        assert_eq!(errors.len(), 1, "Expected one error, got {errors:?}");
        errors.remove(0)
    }

    #[track_caller]
    pub(crate) fn assert_schema_location(
        schema: &serde_json::Value,
        instance: &serde_json::Value,
        expected: &str,
    ) {
        let error = single_error(schema, instance);
        assert_eq!(error.schema_path().as_str(), expected);
    }
}
