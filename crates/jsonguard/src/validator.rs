//! Compiled, reusable validators.
use crate::{
    draft::Draft, evaluator, node::CompiledSchema, options::ValidationOptions,
    output::ValidationResult, value::JsonValue, SchemaError,
};

/// A schema compiled once and applied to any number of instances.
///
/// Validators are immutable after construction and can be shared across threads.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use jsonguard::{JsonValue, Validator};
///
/// let schema = JsonValue::from(serde_json::json!({"maxLength": 3}));
/// let validator = Validator::new(&schema)?;
/// assert!(validator.is_valid(&JsonValue::from("abc")));
///
/// let instance = JsonValue::from("abcd");
/// let result = validator.validate(&instance);
/// assert_eq!(result.errors()[0].to_string(), r#""abcd" is longer than 3 characters"#);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Validator {
    schema: CompiledSchema,
    draft: Draft,
}

impl Validator {
    /// Compile `schema` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the schema is malformed or one of its references can not be
    /// resolved.
    pub fn new(schema: &JsonValue) -> Result<Validator, SchemaError> {
        Self::options().build(schema)
    }

    /// Options for configuring how a validator is built.
    #[must_use]
    pub fn options() -> ValidationOptions {
        ValidationOptions::default()
    }

    pub(crate) fn from_parts(schema: CompiledSchema, draft: Draft) -> Validator {
        Validator { schema, draft }
    }

    /// Validate `instance` and collect every error.
    #[must_use]
    pub fn validate<'i>(&self, instance: &'i JsonValue) -> ValidationResult<'i> {
        ValidationResult::new(evaluator::evaluate(&self.schema, instance))
    }

    /// Check whether `instance` is valid, stopping at the first failure.
    #[must_use]
    pub fn is_valid(&self, instance: &JsonValue) -> bool {
        evaluator::is_valid(&self.schema, instance)
    }

    /// Draft the schema was compiled for.
    #[must_use]
    pub fn draft(&self) -> Draft {
        self.draft
    }

    #[cfg(test)]
    pub(crate) fn schema(&self) -> &CompiledSchema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::Validator;
    use crate::{Draft, JsonValue};
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn validator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator>();
    }

    #[test_case(&json!({}), Draft::Draft7)]
    #[test_case(&json!({"$schema": "http://json-schema.org/draft-04/schema#"}), Draft::Draft4)]
    #[test_case(&json!({"$schema": "http://json-schema.org/draft-06/schema#"}), Draft::Draft6)]
    fn detects_draft(schema: &serde_json::Value, expected: Draft) {
        let validator = Validator::new(&JsonValue::from(schema)).expect("Valid schema");
        assert_eq!(validator.draft(), expected);
    }

    #[test]
    fn explicit_draft_wins() {
        let schema = JsonValue::from(json!({"$schema": "http://json-schema.org/draft-07/schema#"}));
        let validator = Validator::options()
            .with_draft(Draft::Draft4)
            .build(&schema)
            .expect("Valid schema");
        assert_eq!(validator.draft(), Draft::Draft4);
    }

    #[test]
    fn is_valid_agrees_with_validate() {
        let schema = JsonValue::from(json!({
            "type": "object",
            "properties": {"name": {"type": "string"}, "age": {"type": "integer", "minimum": 0}},
            "required": ["age"]
        }));
        let validator = Validator::new(&schema).expect("Valid schema");
        for instance in [
            json!({"name": "a", "age": 1}),
            json!({"name": "a"}),
            json!({"age": -1}),
            json!("nope"),
        ] {
            let instance = JsonValue::from(instance);
            assert_eq!(
                validator.is_valid(&instance),
                validator.validate(&instance).is_valid()
            );
        }
    }
}
