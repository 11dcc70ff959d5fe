use crate::{
    paths::Location,
    value::{JsonValue, Object},
    SchemaError,
};

/// Supported JSON Schema drafts.
#[non_exhaustive]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Draft {
    Draft4,
    Draft6,
    #[default]
    Draft7,
}

impl Draft {
    /// Detect the draft declared by `$schema`.
    ///
    /// Returns `Ok(None)` if the schema does not declare one.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownDraft`] for `$schema` values that name an unsupported
    /// meta-schema.
    pub fn detect(schema: &JsonValue) -> Result<Option<Draft>, SchemaError> {
        match schema.get("$schema") {
            Some(JsonValue::String(uri)) => Draft::from_url(uri)
                .map(Some)
                .ok_or_else(|| SchemaError::UnknownDraft { uri: uri.clone() }),
            _ => Ok(None),
        }
    }

    #[must_use]
    pub fn from_url(url: &str) -> Option<Draft> {
        match url.trim_end_matches('#') {
            "http://json-schema.org/draft-04/schema" | "https://json-schema.org/draft-04/schema" => {
                Some(Draft::Draft4)
            }
            "http://json-schema.org/draft-06/schema" | "https://json-schema.org/draft-06/schema" => {
                Some(Draft::Draft6)
            }
            "http://json-schema.org/draft-07/schema" | "https://json-schema.org/draft-07/schema" => {
                Some(Draft::Draft7)
            }
            _ => None,
        }
    }

    /// Keyword that sets the base URI of a schema resource.
    pub(crate) fn id_keyword(self) -> &'static str {
        match self {
            Draft::Draft4 => "id",
            Draft::Draft6 | Draft::Draft7 => "$id",
        }
    }

    pub(crate) fn has_boolean_exclusive_bounds(self) -> bool {
        self == Draft::Draft4
    }

    pub(crate) fn supports_const(self) -> bool {
        self >= Draft::Draft6
    }

    pub(crate) fn supports_contains(self) -> bool {
        self >= Draft::Draft6
    }

    pub(crate) fn supports_property_names(self) -> bool {
        self >= Draft::Draft6
    }

    pub(crate) fn supports_conditionals(self) -> bool {
        self >= Draft::Draft7
    }

    /// Subschemas directly nested in `schema`, together with their locations.
    pub(crate) fn subresources_of<'a>(
        self,
        location: &Location,
        schema: &'a Object,
    ) -> Vec<(Location, &'a JsonValue)> {
        let mut subresources = Vec::new();
        for (keyword, value) in schema.iter() {
            let keyword = keyword.as_str();
            match keyword {
                "items" => match value {
                    JsonValue::Array(items) => {
                        let location = location.join(keyword);
                        for (idx, item) in items.iter().enumerate() {
                            subresources.push((location.join(idx), item));
                        }
                    }
                    _ => subresources.push((location.join(keyword), value)),
                },
                "allOf" | "anyOf" | "oneOf" => {
                    if let JsonValue::Array(items) = value {
                        let location = location.join(keyword);
                        for (idx, item) in items.iter().enumerate() {
                            subresources.push((location.join(idx), item));
                        }
                    }
                }
                "definitions" | "patternProperties" | "properties" => {
                    if let JsonValue::Object(object) = value {
                        let location = location.join(keyword);
                        for (name, item) in object.iter() {
                            subresources.push((location.join(name), item));
                        }
                    }
                }
                "dependencies" => {
                    if let JsonValue::Object(object) = value {
                        let location = location.join(keyword);
                        for (name, item) in object.iter() {
                            // Arrays here are property lists, not schemas
                            if !matches!(item, JsonValue::Array(_)) {
                                subresources.push((location.join(name), item));
                            }
                        }
                    }
                }
                "additionalItems" | "additionalProperties" | "not" => {
                    subresources.push((location.join(keyword), value));
                }
                "contains" | "propertyNames" if self.supports_contains() => {
                    subresources.push((location.join(keyword), value));
                }
                "if" | "then" | "else" if self.supports_conditionals() => {
                    subresources.push((location.join(keyword), value));
                }
                _ => {}
            }
        }
        subresources
    }
}

#[cfg(test)]
mod tests {
    use super::Draft;
    use crate::{paths::Location, JsonValue};
    use serde_json::json;
    use test_case::test_case;

    #[test_case("http://json-schema.org/draft-04/schema#", Some(Draft::Draft4))]
    #[test_case("http://json-schema.org/draft-06/schema#", Some(Draft::Draft6))]
    #[test_case("http://json-schema.org/draft-07/schema", Some(Draft::Draft7))]
    #[test_case("https://json-schema.org/draft/2020-12/schema", None)]
    fn from_url(url: &str, expected: Option<Draft>) {
        assert_eq!(Draft::from_url(url), expected);
    }

    #[test]
    fn detect_unknown_draft() {
        let schema = JsonValue::from(json!({"$schema": "http://example.com/custom"}));
        assert!(Draft::detect(&schema).is_err());
        let schema = JsonValue::from(json!({"type": "string"}));
        assert_eq!(Draft::detect(&schema).expect("No $schema"), None);
    }

    #[test]
    fn subresources() {
        let schema = JsonValue::from(json!({
            "items": [{"type": "string"}, true],
            "properties": {"a/b": {}},
            "dependencies": {"x": ["y"], "z": {"minimum": 1}},
            "if": {"const": 1},
            "enum": [{"type": "string"}]
        }));
        let object = schema.as_object().expect("Object");
        let locations: Vec<_> = Draft::Draft7
            .subresources_of(&Location::new(), object)
            .into_iter()
            .map(|(location, _)| location.as_str().to_string())
            .collect();
        assert_eq!(
            locations,
            ["/items/0", "/items/1", "/properties/a~1b", "/dependencies/z", "/if"]
        );
        let draft4: Vec<_> = Draft::Draft4
            .subresources_of(&Location::new(), object)
            .into_iter()
            .map(|(location, _)| location.as_str().to_string())
            .collect();
        assert!(!draft4.contains(&"/if".to_string()));
    }
}
