//! Error types for schema compilation and instance validation.
use core::fmt;
use std::{borrow::Cow, error};

use crate::{
    paths::Location,
    types::{JsonType, JsonTypeSet},
    value::{JsonValue, Number},
};

/// A failed constraint found while validating an instance.
///
/// Validation errors are data inside a [`crate::ValidationResult`], not failures of the call.
#[derive(Debug)]
pub struct ValidationError<'i> {
    instance: Cow<'i, JsonValue>,
    kind: ValidationErrorKind,
    instance_path: Location,
    schema_path: Location,
}

/// Kinds of validation failures.
#[derive(Debug)]
#[non_exhaustive]
pub enum ValidationErrorKind {
    /// The input array contains more items than the tuple form of `items` allows.
    AdditionalItems { limit: usize },
    /// Unexpected properties.
    AdditionalProperties { unexpected: Vec<String> },
    /// The input value is not valid under any of the schemas listed in `anyOf`.
    AnyOf,
    /// The input value doesn't match the expected constant.
    Constant { expected: JsonValue },
    /// The input array doesn't contain items conforming to the specified schema.
    Contains,
    /// The input value doesn't match any of the specified options.
    Enum { options: JsonValue },
    ExclusiveMaximum { limit: Number },
    ExclusiveMinimum { limit: Number },
    /// Everything is invalid for the `false` schema.
    FalseSchema,
    MaxItems { limit: u64 },
    Maximum { limit: Number },
    MaxLength { limit: u64 },
    MaxProperties { limit: u64 },
    MinItems { limit: u64 },
    Minimum { limit: Number },
    MinLength { limit: u64 },
    MinProperties { limit: u64 },
    MultipleOf { multiple_of: Number },
    /// Negated schema failed validation.
    Not { schema: JsonValue },
    /// The given schema is valid under more than one of the schemas listed in `oneOf`.
    OneOfMultipleValid { count: usize },
    /// The given schema is not valid under any of the schemas listed in `oneOf`.
    OneOfNotValid,
    /// The input doesn't match the pattern.
    Pattern { pattern: String },
    /// A required property is missing.
    Required { property: String },
    /// The input value doesn't match one or multiple required types.
    Type { kind: TypeKind },
    /// The input array has non-unique elements, as pairs of equal indices.
    UniqueItems { duplicates: Vec<(usize, usize)> },
    /// The regex engine gave up while matching `pattern`.
    BacktrackLimitExceeded { error: fancy_regex::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Single(JsonType),
    Multiple(JsonTypeSet),
}

impl<'i> ValidationError<'i> {
    fn new(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        kind: ValidationErrorKind,
    ) -> ValidationError<'i> {
        ValidationError {
            instance: Cow::Borrowed(instance),
            kind,
            instance_path,
            schema_path,
        }
    }

    /// The value that failed validation.
    #[must_use]
    pub fn instance(&self) -> &JsonValue {
        &self.instance
    }

    #[must_use]
    pub fn kind(&self) -> &ValidationErrorKind {
        &self.kind
    }

    /// JSON Pointer to the failing part of the instance.
    #[must_use]
    pub fn instance_path(&self) -> &Location {
        &self.instance_path
    }

    /// JSON Pointer to the schema keyword that produced this error.
    #[must_use]
    pub fn schema_path(&self) -> &Location {
        &self.schema_path
    }

    /// Detach the error from the lifetime of the validated instance.
    #[must_use]
    pub fn into_owned(self) -> ValidationError<'static> {
        ValidationError {
            instance: Cow::Owned(self.instance.into_owned()),
            kind: self.kind,
            instance_path: self.instance_path,
            schema_path: self.schema_path,
        }
    }

    pub(crate) fn additional_items(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        limit: usize,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::AdditionalItems { limit },
        )
    }

    pub(crate) fn additional_properties(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        unexpected: Vec<String>,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::AdditionalProperties { unexpected },
        )
    }

    pub(crate) fn any_of(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
    ) -> ValidationError<'i> {
        Self::new(schema_path, instance_path, instance, ValidationErrorKind::AnyOf)
    }

    pub(crate) fn backtrack_limit(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        error: fancy_regex::Error,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::BacktrackLimitExceeded { error },
        )
    }

    pub(crate) fn constant(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        expected: JsonValue,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Constant { expected },
        )
    }

    pub(crate) fn contains(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
    ) -> ValidationError<'i> {
        Self::new(schema_path, instance_path, instance, ValidationErrorKind::Contains)
    }

    pub(crate) fn enumeration(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        options: JsonValue,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Enum { options },
        )
    }

    pub(crate) fn exclusive_maximum(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        limit: Number,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::ExclusiveMaximum { limit },
        )
    }

    pub(crate) fn exclusive_minimum(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        limit: Number,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::ExclusiveMinimum { limit },
        )
    }

    pub(crate) fn false_schema(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::FalseSchema,
        )
    }

    pub(crate) fn max_items(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        limit: u64,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::MaxItems { limit },
        )
    }

    pub(crate) fn maximum(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        limit: Number,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Maximum { limit },
        )
    }

    pub(crate) fn max_length(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        limit: u64,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::MaxLength { limit },
        )
    }

    pub(crate) fn max_properties(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        limit: u64,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::MaxProperties { limit },
        )
    }

    pub(crate) fn min_items(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        limit: u64,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::MinItems { limit },
        )
    }

    pub(crate) fn minimum(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        limit: Number,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Minimum { limit },
        )
    }

    pub(crate) fn min_length(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        limit: u64,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::MinLength { limit },
        )
    }

    pub(crate) fn min_properties(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        limit: u64,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::MinProperties { limit },
        )
    }

    pub(crate) fn multiple_of(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        multiple_of: Number,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::MultipleOf { multiple_of },
        )
    }

    pub(crate) fn not(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        schema: JsonValue,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Not { schema },
        )
    }

    pub(crate) fn one_of_multiple_valid(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        count: usize,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::OneOfMultipleValid { count },
        )
    }

    pub(crate) fn one_of_not_valid(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::OneOfNotValid,
        )
    }

    pub(crate) fn pattern(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        pattern: String,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Pattern { pattern },
        )
    }

    pub(crate) fn required(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        property: String,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Required { property },
        )
    }

    pub(crate) fn single_type_error(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        type_name: JsonType,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Type {
                kind: TypeKind::Single(type_name),
            },
        )
    }

    pub(crate) fn multiple_type_error(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        types: JsonTypeSet,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Type {
                kind: TypeKind::Multiple(types),
            },
        )
    }

    pub(crate) fn unique_items(
        schema_path: Location,
        instance_path: Location,
        instance: &'i JsonValue,
        duplicates: Vec<(usize, usize)>,
    ) -> ValidationError<'i> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::UniqueItems { duplicates },
        )
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    let quoted = serde_json::to_string(value).map_err(|_| fmt::Error)?;
    f.write_str(&quoted)
}

fn plural(count: u64, singular: &'static str, plural: &'static str) -> &'static str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

impl error::Error for ValidationError<'_> {}

impl fmt::Display for ValidationError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instance = &*self.instance;
        match &self.kind {
            ValidationErrorKind::AdditionalItems { limit } => {
                let extra = instance
                    .as_array()
                    .map(|items| items.get(*limit..).unwrap_or_default())
                    .unwrap_or_default();
                f.write_str("Additional items are not allowed (")?;
                for (idx, item) in extra.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                let verb = if extra.len() == 1 { "was" } else { "were" };
                write!(f, " {verb} unexpected)")
            }
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                f.write_str("Additional properties are not allowed (")?;
                for (idx, property) in unexpected.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{property}'")?;
                }
                let verb = if unexpected.len() == 1 { "was" } else { "were" };
                write!(f, " {verb} unexpected)")
            }
            ValidationErrorKind::AnyOf => write!(
                f,
                "{instance} is not valid under any of the schemas listed in the 'anyOf' keyword"
            ),
            ValidationErrorKind::BacktrackLimitExceeded { error } => fmt::Display::fmt(error, f),
            ValidationErrorKind::Constant { expected } => write!(f, "{expected} was expected"),
            ValidationErrorKind::Contains => write!(
                f,
                "None of {instance} are valid under the given schema"
            ),
            ValidationErrorKind::Enum { options } => write!(f, "{instance} is not one of {options}"),
            ValidationErrorKind::ExclusiveMaximum { limit } => write!(
                f,
                "{instance} is greater than or equal to the maximum of {limit}"
            ),
            ValidationErrorKind::ExclusiveMinimum { limit } => write!(
                f,
                "{instance} is less than or equal to the minimum of {limit}"
            ),
            ValidationErrorKind::FalseSchema => {
                write!(f, "False schema does not allow {instance}")
            }
            ValidationErrorKind::Maximum { limit } => {
                write!(f, "{instance} is greater than the maximum of {limit}")
            }
            ValidationErrorKind::Minimum { limit } => {
                write!(f, "{instance} is less than the minimum of {limit}")
            }
            ValidationErrorKind::MaxLength { limit } => write!(
                f,
                "{instance} is longer than {limit} {}",
                plural(*limit, "character", "characters")
            ),
            ValidationErrorKind::MinLength { limit } => write!(
                f,
                "{instance} is shorter than {limit} {}",
                plural(*limit, "character", "characters")
            ),
            ValidationErrorKind::MaxItems { limit } => write!(
                f,
                "{instance} has more than {limit} {}",
                plural(*limit, "item", "items")
            ),
            ValidationErrorKind::MinItems { limit } => write!(
                f,
                "{instance} has less than {limit} {}",
                plural(*limit, "item", "items")
            ),
            ValidationErrorKind::MaxProperties { limit } => write!(
                f,
                "{instance} has more than {limit} {}",
                plural(*limit, "property", "properties")
            ),
            ValidationErrorKind::MinProperties { limit } => write!(
                f,
                "{instance} has less than {limit} {}",
                plural(*limit, "property", "properties")
            ),
            ValidationErrorKind::MultipleOf { multiple_of } => {
                write!(f, "{instance} is not a multiple of {multiple_of}")
            }
            ValidationErrorKind::Not { schema } => {
                write!(f, "{schema} is not allowed for {instance}")
            }
            ValidationErrorKind::OneOfMultipleValid { count } => write!(
                f,
                "{instance} is valid under more than one of the schemas listed in the 'oneOf' keyword ({count} matched)"
            ),
            ValidationErrorKind::OneOfNotValid => write!(
                f,
                "{instance} is not valid under any of the schemas listed in the 'oneOf' keyword"
            ),
            ValidationErrorKind::Pattern { pattern } => {
                write!(f, "{instance} does not match ")?;
                write_quoted(f, pattern)
            }
            ValidationErrorKind::Required { property } => {
                write_quoted(f, property)?;
                f.write_str(" is a required property")
            }
            ValidationErrorKind::Type {
                kind: TypeKind::Single(type_name),
            } => write!(f, "{instance} is not of type \"{type_name}\""),
            ValidationErrorKind::Type {
                kind: TypeKind::Multiple(types),
            } => {
                write!(f, "{instance} is not of types ")?;
                for (idx, type_name) in types.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{type_name}\"")?;
                }
                Ok(())
            }
            ValidationErrorKind::UniqueItems { duplicates } => {
                write!(f, "{instance} has non-unique elements (")?;
                for (idx, (first, second)) in duplicates.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{first} and {second}")?;
                }
                f.write_str(" are equal)")
            }
        }
    }
}

/// Errors that prevent a schema from being compiled.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// A `$ref` target could not be found in any known document.
    #[error("Unresolvable reference {reference:?} at '{location}'")]
    UnresolvedRef { reference: String, location: Location },
    /// A value in a schema position is neither an object nor a boolean.
    #[error("Invalid schema at '{location}': {reason}")]
    InvalidSchema { location: Location, reason: String },
    /// A keyword has a value of the wrong shape.
    #[error("Invalid value for '{keyword}' at '{location}': expected {expected}")]
    InvalidKeyword {
        keyword: &'static str,
        location: Location,
        expected: &'static str,
    },
    /// A lower bound keyword exceeds its upper bound counterpart.
    #[error("'{lower}' is greater than '{upper}' at '{location}'")]
    InvalidBounds {
        lower: &'static str,
        upper: &'static str,
        location: Location,
    },
    /// A `pattern` or `patternProperties` key is not a valid regular expression.
    #[error("Invalid regular expression {pattern:?} at '{location}': {reason}")]
    InvalidPattern {
        pattern: String,
        location: Location,
        reason: String,
    },
    /// `required` names a property that `additionalProperties: false` forbids.
    #[error("Required property {property:?} at '{location}' is not allowed by the schema")]
    UnsatisfiableRequired { property: String, location: Location },
    /// `$schema` names a meta-schema that is not supported.
    #[error("Unknown meta-schema: {uri}")]
    UnknownDraft { uri: String },
    #[error("Invalid URI {uri:?}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },
    /// The configured retriever failed to load an external document.
    #[error("Failed to retrieve {uri}")]
    Retrieval {
        uri: String,
        #[source]
        source: Box<dyn error::Error + Send + Sync>,
    },
}

impl SchemaError {
    pub(crate) fn invalid_keyword(
        keyword: &'static str,
        location: &Location,
        expected: &'static str,
    ) -> SchemaError {
        SchemaError::InvalidKeyword {
            keyword,
            location: location.join(keyword),
            expected,
        }
    }
}
