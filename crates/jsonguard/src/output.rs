//! Outcome of validating one instance.
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serialize, Serializer,
};

use crate::error::ValidationError;

/// Ordered validation errors for a single instance.
///
/// The instance is valid if and only if there are no errors. Serializes as
/// `{"valid": bool, "errors": [{"path": "...", "message": "..."}]}`.
#[derive(Debug)]
pub struct ValidationResult<'i> {
    errors: Vec<ValidationError<'i>>,
}

impl<'i> ValidationResult<'i> {
    pub(crate) fn new(errors: Vec<ValidationError<'i>>) -> ValidationResult<'i> {
        ValidationResult { errors }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError<'i>] {
        &self.errors
    }

    #[must_use]
    pub fn into_errors(self) -> Vec<ValidationError<'i>> {
        self.errors
    }

    /// Detach the result from the lifetime of the validated instance.
    #[must_use]
    pub fn into_owned(self) -> ValidationResult<'static> {
        ValidationResult {
            errors: self
                .errors
                .into_iter()
                .map(ValidationError::into_owned)
                .collect(),
        }
    }
}

struct ErrorEntry<'a, 'i>(&'a ValidationError<'i>);

impl Serialize for ErrorEntry<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("path", self.0.instance_path())?;
        map.serialize_entry("message", &self.0.to_string())?;
        map.end()
    }
}

struct ErrorList<'a, 'i>(&'a [ValidationError<'i>]);

impl Serialize for ErrorList<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for error in self.0 {
            seq.serialize_element(&ErrorEntry(error))?;
        }
        seq.end()
    }
}

impl Serialize for ValidationResult<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("valid", &self.is_valid())?;
        map.serialize_entry("errors", &ErrorList(&self.errors))?;
        map.end()
    }
}
