use super::Evaluator;
use crate::{
    error::ValidationError,
    node::{AdditionalProperties, Dependency, NodeId, Properties},
    paths::LazyLocation,
    value::{JsonValue, Object},
};

impl<'s> Evaluator<'s> {
    pub(super) fn is_valid_properties(&mut self, properties: &'s Properties, object: &Object) -> bool {
        for (name, value) in object.iter() {
            let mut matched = false;
            if let Some(node) = properties.properties.get(name) {
                matched = true;
                if !self.is_valid(*node, value) {
                    return false;
                }
            }
            for (pattern, node) in &*properties.patterns {
                // A pattern that gives up on backtracking does not match
                if pattern.is_match(name).unwrap_or(false) {
                    matched = true;
                    if !self.is_valid(*node, value) {
                        return false;
                    }
                }
            }
            if !matched {
                match &properties.additional {
                    AdditionalProperties::Allowed => {}
                    AdditionalProperties::Forbidden(_) => return false,
                    AdditionalProperties::Schema(node) => {
                        if !self.is_valid(*node, value) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    pub(super) fn validate_properties<'i>(
        &mut self,
        properties: &'s Properties,
        object: &'i Object,
        instance: &'i JsonValue,
        location: &LazyLocation<'_>,
        errors: &mut Vec<ValidationError<'i>>,
    ) {
        let mut unexpected = Vec::new();
        for (name, value) in object.iter() {
            let location = location.push(name);
            let mut matched = false;
            if let Some(node) = properties.properties.get(name) {
                matched = true;
                self.validate(*node, value, &location, errors);
            }
            for (pattern, node) in &*properties.patterns {
                if pattern.is_match(name).unwrap_or(false) {
                    matched = true;
                    self.validate(*node, value, &location, errors);
                }
            }
            if !matched {
                match &properties.additional {
                    AdditionalProperties::Allowed => {}
                    AdditionalProperties::Forbidden(_) => unexpected.push(name.clone()),
                    AdditionalProperties::Schema(node) => {
                        self.validate(*node, value, &location, errors);
                    }
                }
            }
        }
        if let AdditionalProperties::Forbidden(schema_path) = &properties.additional {
            if !unexpected.is_empty() {
                errors.push(ValidationError::additional_properties(
                    schema_path.clone(),
                    location.into(),
                    instance,
                    unexpected,
                ));
            }
        }
    }

    /// Property names are validated as string instances located at the object itself.
    pub(super) fn validate_property_names<'i>(
        &mut self,
        node: NodeId,
        object: &'i Object,
        location: &LazyLocation<'_>,
        errors: &mut Vec<ValidationError<'i>>,
    ) {
        for name in object.keys() {
            let name = JsonValue::String(name.clone());
            let mut inner = Vec::new();
            self.validate(node, &name, location, &mut inner);
            for error in inner {
                errors.push(error.into_owned());
            }
        }
    }

    pub(super) fn is_valid_dependencies(
        &mut self,
        dependencies: &'s [(String, Dependency)],
        object: &Object,
        instance: &JsonValue,
    ) -> bool {
        dependencies
            .iter()
            .filter(|(name, _)| object.contains_key(name))
            .all(|(_, dependency)| match dependency {
                Dependency::Properties { names, .. } => {
                    names.iter().all(|name| object.contains_key(name))
                }
                Dependency::Schema(node) => self.is_valid(*node, instance),
            })
    }

    pub(super) fn validate_dependencies<'i>(
        &mut self,
        dependencies: &'s [(String, Dependency)],
        object: &'i Object,
        instance: &'i JsonValue,
        location: &LazyLocation<'_>,
        errors: &mut Vec<ValidationError<'i>>,
    ) {
        for (name, dependency) in dependencies {
            if !object.contains_key(name) {
                continue;
            }
            match dependency {
                Dependency::Properties {
                    names,
                    location: schema_path,
                } => {
                    for required in names.iter() {
                        if !object.contains_key(required) {
                            errors.push(ValidationError::required(
                                schema_path.clone(),
                                location.into(),
                                instance,
                                required.clone(),
                            ));
                        }
                    }
                }
                Dependency::Schema(node) => self.validate(*node, instance, location, errors),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(&json!({"properties": {"a": {"type": "string"}}}), &json!({"a": "x", "b": 1}))]
    #[test_case(&json!({"patternProperties": {"^x-": {"type": "integer"}}}), &json!({"x-a": 1, "y": "z"}))]
    #[test_case(&json!({"properties": {"a": {}}, "additionalProperties": false}), &json!({"a": 1}))]
    #[test_case(&json!({"additionalProperties": {"type": "integer"}}), &json!({"a": 1, "b": 2}))]
    #[test_case(&json!({"propertyNames": {"maxLength": 3}}), &json!({"abc": 1}))]
    #[test_case(&json!({"dependencies": {"a": ["b"]}}), &json!({"b": 1}); "absent trigger")]
    #[test_case(&json!({"dependencies": {"a": ["b"]}}), &json!({"a": 1, "b": 1}); "present dependency")]
    #[test_case(&json!({"dependencies": {"a": {"required": ["c"]}}}), &json!({"a": 1, "c": 1}))]
    fn valid(schema: &serde_json::Value, instance: &serde_json::Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"properties": {"a": {"type": "string"}}}), &json!({"a": 1}), "/properties/a/type", "/a")]
    #[test_case(&json!({"patternProperties": {"^x-": {"type": "integer"}}}), &json!({"x-a": "1"}), "/patternProperties/^x-/type", "/x-a")]
    #[test_case(&json!({"additionalProperties": {"type": "integer"}}), &json!({"a/b": "1"}), "/additionalProperties/type", "/a~1b")]
    #[test_case(&json!({"propertyNames": {"maxLength": 3}}), &json!({"abcd": 1}), "/propertyNames/maxLength", "")]
    #[test_case(&json!({"dependencies": {"a": ["b"]}}), &json!({"a": 1}), "/dependencies/a", "")]
    #[test_case(&json!({"dependencies": {"a": {"required": ["c"]}}}), &json!({"a": 1}), "/dependencies/a/required", "")]
    fn invalid(schema: &serde_json::Value, instance: &serde_json::Value, schema_path: &str, instance_path: &str) {
        let error = tests_util::single_error(schema, instance);
        assert_eq!(error.schema_path().as_str(), schema_path);
        assert_eq!(error.instance_path().as_str(), instance_path);
    }

    #[test]
    fn properties_and_patterns_both_apply() {
        let schema = json!({
            "properties": {"x-a": {"minimum": 0}},
            "patternProperties": {"^x-": {"maximum": 10}}
        });
        tests_util::is_valid(&schema, &json!({"x-a": 5}));
        tests_util::assert_schema_location(&schema, &json!({"x-a": 11}), "/patternProperties/^x-/maximum");
        tests_util::assert_schema_location(&schema, &json!({"x-a": -1}), "/properties/x-a/minimum");
    }

    #[test]
    fn additional_properties_lists_every_name() {
        let schema = json!({"properties": {"a": {}}, "additionalProperties": false});
        let error = tests_util::single_error(&schema, &json!({"a": 1, "b": 2, "c": 3}));
        assert_eq!(error.schema_path().as_str(), "/additionalProperties");
        assert_eq!(
            error.to_string(),
            "Additional properties are not allowed ('b', 'c' were unexpected)"
        );
    }

    #[test]
    fn missing_required_properties_are_reported_individually() {
        let schema = json!({"required": ["a", "b", "c"]});
        let errors = tests_util::errors(&schema, &json!({"b": 1}));
        let messages: Vec<_> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            [r#""a" is a required property"#, r#""c" is a required property"#]
        );
    }
}
