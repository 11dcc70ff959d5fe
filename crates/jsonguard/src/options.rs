//! Configuration for building validators.
use std::sync::Arc;

use crate::{
    compiler, draft::Draft, retriever::Retrieve, validator::Validator, value::JsonValue,
    SchemaError,
};

/// Configuration for building a [`Validator`].
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use jsonguard::{Draft, JsonValue};
///
/// let schema = JsonValue::from(serde_json::json!({"type": "string"}));
/// let validator = jsonguard::options()
///     .with_draft(Draft::Draft4)
///     .build(&schema)?;
/// assert!(validator.is_valid(&JsonValue::from("foo")));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct ValidationOptions {
    draft: Option<Draft>,
    base_uri: Option<String>,
    resources: Vec<(String, JsonValue)>,
    retriever: Option<Arc<dyn Retrieve>>,
    pattern_options: PatternOptions,
}

impl ValidationOptions {
    /// Use `draft` instead of detecting it from `$schema`.
    #[must_use]
    pub fn with_draft(mut self, draft: Draft) -> Self {
        self.draft = Some(draft);
        self
    }

    /// Base URI of the root schema, used to resolve relative `$id` and `$ref` values.
    #[must_use]
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    /// Make `contents` available to `$ref` under `uri` without retrieving it.
    #[must_use]
    pub fn with_resource(mut self, uri: impl Into<String>, contents: JsonValue) -> Self {
        self.resources.push((uri.into(), contents));
        self
    }

    /// Loader for external documents referenced by `$ref`.
    #[must_use]
    pub fn with_retriever(mut self, retriever: impl Retrieve + 'static) -> Self {
        self.retriever = Some(Arc::new(retriever));
        self
    }

    /// Regular expression engine used for `pattern` and `patternProperties`.
    #[must_use]
    pub fn with_pattern_options(mut self, options: PatternOptions) -> Self {
        self.pattern_options = options;
        self
    }

    /// Compile `schema` with these options.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the schema is malformed or one of its references can not be
    /// resolved.
    pub fn build(&self, schema: &JsonValue) -> Result<Validator, SchemaError> {
        let draft = match self.draft {
            Some(draft) => draft,
            None => Draft::detect(schema)?.unwrap_or_default(),
        };
        let compiled = compiler::compile(schema, draft, self)?;
        Ok(Validator::from_parts(compiled, draft))
    }

    pub(crate) fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    pub(crate) fn resources(&self) -> &[(String, JsonValue)] {
        &self.resources
    }

    pub(crate) fn retriever(&self) -> Option<&dyn Retrieve> {
        self.retriever.as_deref()
    }

    pub(crate) fn pattern_options(&self) -> &PatternOptions {
        &self.pattern_options
    }
}

/// Regular expression engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternOptions {
    /// Backtracking engine with support for lookaround and backreferences.
    FancyRegex {
        backtrack_limit: Option<usize>,
        size_limit: Option<usize>,
        dfa_size_limit: Option<usize>,
    },
    /// Linear-time engine without backtracking features.
    Regex {
        size_limit: Option<usize>,
        dfa_size_limit: Option<usize>,
    },
}

impl Default for PatternOptions {
    fn default() -> Self {
        PatternOptions::fancy_regex()
    }
}

impl PatternOptions {
    #[must_use]
    pub fn fancy_regex() -> Self {
        PatternOptions::FancyRegex {
            backtrack_limit: None,
            size_limit: None,
            dfa_size_limit: None,
        }
    }

    #[must_use]
    pub fn regex() -> Self {
        PatternOptions::Regex {
            size_limit: None,
            dfa_size_limit: None,
        }
    }

    /// Maximum number of backtracking steps. Ignored by the `regex` engine.
    #[must_use]
    pub fn backtrack_limit(mut self, limit: usize) -> Self {
        if let PatternOptions::FancyRegex {
            backtrack_limit, ..
        } = &mut self
        {
            *backtrack_limit = Some(limit);
        }
        self
    }

    /// Approximate size limit of a compiled regex, in bytes.
    #[must_use]
    pub fn size_limit(mut self, limit: usize) -> Self {
        match &mut self {
            PatternOptions::FancyRegex { size_limit, .. }
            | PatternOptions::Regex { size_limit, .. } => *size_limit = Some(limit),
        }
        self
    }

    /// Size limit of the lazy DFA cache, in bytes.
    #[must_use]
    pub fn dfa_size_limit(mut self, limit: usize) -> Self {
        match &mut self {
            PatternOptions::FancyRegex { dfa_size_limit, .. }
            | PatternOptions::Regex { dfa_size_limit, .. } => *dfa_size_limit = Some(limit),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::PatternOptions;

    #[test]
    fn backtrack_limit_only_applies_to_fancy_regex() {
        assert_eq!(
            PatternOptions::regex().backtrack_limit(5).size_limit(10),
            PatternOptions::Regex {
                size_limit: Some(10),
                dfa_size_limit: None
            }
        );
        assert_eq!(
            PatternOptions::fancy_regex().backtrack_limit(5),
            PatternOptions::FancyRegex {
                backtrack_limit: Some(5),
                size_limit: None,
                dfa_size_limit: None
            }
        );
    }
}
