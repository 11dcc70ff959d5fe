//! Evaluation of instances against a [`CompiledSchema`].
mod array;
mod helpers;
mod object;

use crate::{
    error::ValidationError,
    node::{CompiledSchema, Constraint, ConstraintKind, NodeId, NodeKind},
    paths::LazyLocation,
    value::JsonValue,
};

/// Collect every error produced by `instance`, in schema order.
pub(crate) fn evaluate<'i>(
    schema: &CompiledSchema,
    instance: &'i JsonValue,
) -> Vec<ValidationError<'i>> {
    let mut errors = Vec::new();
    Evaluator::new(schema).validate(schema.root(), instance, &LazyLocation::new(), &mut errors);
    errors
}

pub(crate) fn is_valid(schema: &CompiledSchema, instance: &JsonValue) -> bool {
    Evaluator::new(schema).is_valid(schema.root(), instance)
}

/// Per-call evaluation state.
pub(crate) struct Evaluator<'s> {
    schema: &'s CompiledSchema,
    /// `$ref` targets being evaluated, with the address of their instance.
    active_references: Vec<(NodeId, *const JsonValue)>,
}

impl<'s> Evaluator<'s> {
    pub(crate) fn new(schema: &'s CompiledSchema) -> Self {
        Evaluator {
            schema,
            active_references: Vec::new(),
        }
    }

    /// Short-circuiting check without error collection.
    pub(crate) fn is_valid(&mut self, id: NodeId, instance: &JsonValue) -> bool {
        let schema = self.schema;
        match &schema.node(id).kind {
            NodeKind::AlwaysValid => true,
            NodeKind::AlwaysInvalid => false,
            NodeKind::Constraints(constraints) => constraints
                .iter()
                .all(|constraint| self.is_valid_constraint(constraint, instance)),
        }
    }

    /// Evaluate every constraint of the node, appending errors to `errors`.
    pub(crate) fn validate<'i>(
        &mut self,
        id: NodeId,
        instance: &'i JsonValue,
        location: &LazyLocation<'_>,
        errors: &mut Vec<ValidationError<'i>>,
    ) {
        let schema = self.schema;
        let node = schema.node(id);
        match &node.kind {
            NodeKind::AlwaysValid => {}
            NodeKind::AlwaysInvalid => errors.push(ValidationError::false_schema(
                node.location.clone(),
                location.into(),
                instance,
            )),
            NodeKind::Constraints(constraints) => {
                for constraint in constraints.iter() {
                    self.validate_constraint(constraint, instance, location, errors);
                }
            }
        }
    }

    /// Run `evaluate` unless the same reference is already being evaluated for this instance.
    ///
    /// Such a re-entry can only recurse without making progress, so it contributes nothing.
    fn with_reference<R>(
        &mut self,
        target: NodeId,
        instance: &JsonValue,
        unchanged: R,
        evaluate: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let key = (target, core::ptr::from_ref(instance));
        if self.active_references.contains(&key) {
            return unchanged;
        }
        self.active_references.push(key);
        let result = evaluate(self);
        self.active_references.pop();
        result
    }

    fn is_valid_constraint(&mut self, constraint: &'s Constraint, instance: &JsonValue) -> bool {
        match (&constraint.kind, instance) {
            (ConstraintKind::Type(types), _) => types.contains_value_type(instance),
            (ConstraintKind::Enum(options), _) => options.contains(instance),
            (ConstraintKind::Const(expected), _) => expected == instance,
            (ConstraintKind::Minimum { limit, exclusive }, JsonValue::Number(number)) => {
                if *exclusive {
                    number.as_f64() > limit.as_f64()
                } else {
                    number.as_f64() >= limit.as_f64()
                }
            }
            (ConstraintKind::Maximum { limit, exclusive }, JsonValue::Number(number)) => {
                if *exclusive {
                    number.as_f64() < limit.as_f64()
                } else {
                    number.as_f64() <= limit.as_f64()
                }
            }
            (ConstraintKind::MultipleOf(multiple_of), JsonValue::Number(number)) => {
                helpers::is_multiple_of(number.as_f64(), multiple_of.as_f64())
            }
            (ConstraintKind::MinLength(limit), JsonValue::String(value)) => {
                helpers::char_count(value) >= *limit
            }
            (ConstraintKind::MaxLength(limit), JsonValue::String(value)) => {
                helpers::char_count(value) <= *limit
            }
            (ConstraintKind::Pattern(pattern), JsonValue::String(value)) => {
                pattern.is_match(value).unwrap_or(false)
            }
            (ConstraintKind::MinItems(limit), JsonValue::Array(items)) => {
                items.len() as u64 >= *limit
            }
            (ConstraintKind::MaxItems(limit), JsonValue::Array(items)) => {
                items.len() as u64 <= *limit
            }
            (ConstraintKind::UniqueItems, JsonValue::Array(items)) => helpers::is_unique(items),
            (ConstraintKind::Items(items), JsonValue::Array(values)) => {
                self.is_valid_items(items, values)
            }
            (ConstraintKind::Contains(node), JsonValue::Array(items)) => {
                items.iter().any(|item| self.is_valid(*node, item))
            }
            (ConstraintKind::Required(names), JsonValue::Object(object)) => {
                names.iter().all(|name| object.contains_key(name))
            }
            (ConstraintKind::Properties(properties), JsonValue::Object(object)) => {
                self.is_valid_properties(properties, object)
            }
            (ConstraintKind::PropertyNames(node), JsonValue::Object(object)) => object
                .keys()
                .all(|name| self.is_valid(*node, &JsonValue::String(name.clone()))),
            (ConstraintKind::MinProperties(limit), JsonValue::Object(object)) => {
                object.len() as u64 >= *limit
            }
            (ConstraintKind::MaxProperties(limit), JsonValue::Object(object)) => {
                object.len() as u64 <= *limit
            }
            (ConstraintKind::Dependencies(dependencies), JsonValue::Object(object)) => {
                self.is_valid_dependencies(dependencies, object, instance)
            }
            (ConstraintKind::AllOf(nodes), _) => {
                nodes.iter().all(|node| self.is_valid(*node, instance))
            }
            (ConstraintKind::AnyOf(nodes), _) => {
                nodes.iter().any(|node| self.is_valid(*node, instance))
            }
            (ConstraintKind::OneOf(nodes), _) => self.count_valid(nodes, instance, 2) == 1,
            (ConstraintKind::Not { node, .. }, _) => !self.is_valid(*node, instance),
            (
                ConstraintKind::Conditional {
                    condition,
                    then,
                    otherwise,
                },
                _,
            ) => {
                let branch = if self.is_valid(*condition, instance) {
                    then
                } else {
                    otherwise
                };
                branch.is_none_or(|node| self.is_valid(node, instance))
            }
            (ConstraintKind::Reference(target), _) => {
                self.with_reference(*target, instance, true, |this| {
                    this.is_valid(*target, instance)
                })
            }
            // Keywords do not apply to instances of other types
            _ => true,
        }
    }

    /// Number of branches `instance` is valid against, counting at most up to `limit`.
    fn count_valid(&mut self, nodes: &[NodeId], instance: &JsonValue, limit: usize) -> usize {
        let mut count = 0;
        for node in nodes {
            if self.is_valid(*node, instance) {
                count += 1;
                if count >= limit {
                    break;
                }
            }
        }
        count
    }

    fn validate_constraint<'i>(
        &mut self,
        constraint: &'s Constraint,
        instance: &'i JsonValue,
        location: &LazyLocation<'_>,
        errors: &mut Vec<ValidationError<'i>>,
    ) {
        let schema_path = || constraint.location.clone();
        match (&constraint.kind, instance) {
            (ConstraintKind::Type(types), _) => {
                if !types.contains_value_type(instance) {
                    let mut iter = types.iter();
                    let error = match (iter.next(), iter.next()) {
                        (Some(single), None) => ValidationError::single_type_error(
                            schema_path(),
                            location.into(),
                            instance,
                            single,
                        ),
                        _ => ValidationError::multiple_type_error(
                            schema_path(),
                            location.into(),
                            instance,
                            *types,
                        ),
                    };
                    errors.push(error);
                }
            }
            (ConstraintKind::Enum(options), _) => {
                if !options.contains(instance) {
                    errors.push(ValidationError::enumeration(
                        schema_path(),
                        location.into(),
                        instance,
                        JsonValue::Array(options.to_vec()),
                    ));
                }
            }
            (ConstraintKind::Const(expected), _) => {
                if expected != instance {
                    errors.push(ValidationError::constant(
                        schema_path(),
                        location.into(),
                        instance,
                        expected.clone(),
                    ));
                }
            }
            (ConstraintKind::Minimum { limit, exclusive }, JsonValue::Number(_)) => {
                if !self.is_valid_constraint(constraint, instance) {
                    errors.push(if *exclusive {
                        ValidationError::exclusive_minimum(schema_path(), location.into(), instance, *limit)
                    } else {
                        ValidationError::minimum(schema_path(), location.into(), instance, *limit)
                    });
                }
            }
            (ConstraintKind::Maximum { limit, exclusive }, JsonValue::Number(_)) => {
                if !self.is_valid_constraint(constraint, instance) {
                    errors.push(if *exclusive {
                        ValidationError::exclusive_maximum(schema_path(), location.into(), instance, *limit)
                    } else {
                        ValidationError::maximum(schema_path(), location.into(), instance, *limit)
                    });
                }
            }
            (ConstraintKind::MultipleOf(multiple_of), JsonValue::Number(number)) => {
                if !helpers::is_multiple_of(number.as_f64(), multiple_of.as_f64()) {
                    errors.push(ValidationError::multiple_of(
                        schema_path(),
                        location.into(),
                        instance,
                        *multiple_of,
                    ));
                }
            }
            (ConstraintKind::MinLength(limit), JsonValue::String(value)) => {
                if helpers::char_count(value) < *limit {
                    errors.push(ValidationError::min_length(
                        schema_path(),
                        location.into(),
                        instance,
                        *limit,
                    ));
                }
            }
            (ConstraintKind::MaxLength(limit), JsonValue::String(value)) => {
                if helpers::char_count(value) > *limit {
                    errors.push(ValidationError::max_length(
                        schema_path(),
                        location.into(),
                        instance,
                        *limit,
                    ));
                }
            }
            (ConstraintKind::Pattern(pattern), JsonValue::String(value)) => {
                match pattern.is_match(value) {
                    Ok(true) => {}
                    Ok(false) => errors.push(ValidationError::pattern(
                        schema_path(),
                        location.into(),
                        instance,
                        pattern.as_str().to_string(),
                    )),
                    Err(error) => errors.push(ValidationError::backtrack_limit(
                        schema_path(),
                        location.into(),
                        instance,
                        error,
                    )),
                }
            }
            (ConstraintKind::MinItems(limit), JsonValue::Array(items)) => {
                if (items.len() as u64) < *limit {
                    errors.push(ValidationError::min_items(
                        schema_path(),
                        location.into(),
                        instance,
                        *limit,
                    ));
                }
            }
            (ConstraintKind::MaxItems(limit), JsonValue::Array(items)) => {
                if items.len() as u64 > *limit {
                    errors.push(ValidationError::max_items(
                        schema_path(),
                        location.into(),
                        instance,
                        *limit,
                    ));
                }
            }
            (ConstraintKind::UniqueItems, JsonValue::Array(items)) => {
                if !helpers::is_unique(items) {
                    errors.push(ValidationError::unique_items(
                        schema_path(),
                        location.into(),
                        instance,
                        helpers::duplicates(items),
                    ));
                }
            }
            (ConstraintKind::Items(items), JsonValue::Array(values)) => {
                self.validate_items(items, values, instance, location, errors);
            }
            (ConstraintKind::Contains(node), JsonValue::Array(items)) => {
                if !items.iter().any(|item| self.is_valid(*node, item)) {
                    errors.push(ValidationError::contains(
                        schema_path(),
                        location.into(),
                        instance,
                    ));
                }
            }
            (ConstraintKind::Required(names), JsonValue::Object(object)) => {
                for name in names.iter() {
                    if !object.contains_key(name) {
                        errors.push(ValidationError::required(
                            schema_path(),
                            location.into(),
                            instance,
                            name.clone(),
                        ));
                    }
                }
            }
            (ConstraintKind::Properties(properties), JsonValue::Object(object)) => {
                self.validate_properties(properties, object, instance, location, errors);
            }
            (ConstraintKind::PropertyNames(node), JsonValue::Object(object)) => {
                self.validate_property_names(*node, object, location, errors);
            }
            (ConstraintKind::MinProperties(limit), JsonValue::Object(object)) => {
                if (object.len() as u64) < *limit {
                    errors.push(ValidationError::min_properties(
                        schema_path(),
                        location.into(),
                        instance,
                        *limit,
                    ));
                }
            }
            (ConstraintKind::MaxProperties(limit), JsonValue::Object(object)) => {
                if object.len() as u64 > *limit {
                    errors.push(ValidationError::max_properties(
                        schema_path(),
                        location.into(),
                        instance,
                        *limit,
                    ));
                }
            }
            (ConstraintKind::Dependencies(dependencies), JsonValue::Object(object)) => {
                self.validate_dependencies(dependencies, object, instance, location, errors);
            }
            (ConstraintKind::AllOf(nodes), _) => {
                for node in nodes.iter() {
                    self.validate(*node, instance, location, errors);
                }
            }
            (ConstraintKind::AnyOf(nodes), _) => {
                if nodes.iter().any(|node| self.is_valid(*node, instance)) {
                    return;
                }
                errors.push(ValidationError::any_of(
                    schema_path(),
                    location.into(),
                    instance,
                ));
                for node in nodes.iter() {
                    self.validate(*node, instance, location, errors);
                }
            }
            (ConstraintKind::OneOf(nodes), _) => {
                let count = self.count_valid(nodes, instance, usize::MAX);
                if count == 0 {
                    errors.push(ValidationError::one_of_not_valid(
                        schema_path(),
                        location.into(),
                        instance,
                    ));
                    for node in nodes.iter() {
                        self.validate(*node, instance, location, errors);
                    }
                } else if count > 1 {
                    errors.push(ValidationError::one_of_multiple_valid(
                        schema_path(),
                        location.into(),
                        instance,
                        count,
                    ));
                }
            }
            (ConstraintKind::Not { node, schema }, _) => {
                if self.is_valid(*node, instance) {
                    errors.push(ValidationError::not(
                        schema_path(),
                        location.into(),
                        instance,
                        schema.clone(),
                    ));
                }
            }
            (
                ConstraintKind::Conditional {
                    condition,
                    then,
                    otherwise,
                },
                _,
            ) => {
                // Errors of `if` itself are never reported
                let branch = if self.is_valid(*condition, instance) {
                    then
                } else {
                    otherwise
                };
                if let Some(node) = branch {
                    self.validate(*node, instance, location, errors);
                }
            }
            (ConstraintKind::Reference(target), _) => {
                self.with_reference(*target, instance, (), |this| {
                    this.validate(*target, instance, location, errors);
                });
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(&json!({"minimum": 5}), &json!(4), "/minimum", "4 is less than the minimum of 5")]
    #[test_case(&json!({"exclusiveMinimum": 5}), &json!(5), "/exclusiveMinimum", "5 is less than or equal to the minimum of 5")]
    #[test_case(&json!({"maximum": 5}), &json!(6), "/maximum", "6 is greater than the maximum of 5")]
    #[test_case(&json!({"exclusiveMaximum": 5}), &json!(5), "/exclusiveMaximum", "5 is greater than or equal to the maximum of 5")]
    #[test_case(&json!({"multipleOf": 2}), &json!(7), "/multipleOf", "7 is not a multiple of 2")]
    #[test_case(&json!({"minLength": 2}), &json!("a"), "/minLength", r#""a" is shorter than 2 characters"#)]
    #[test_case(&json!({"maxLength": 1}), &json!("ab"), "/maxLength", r#""ab" is longer than 1 character"#)]
    #[test_case(&json!({"pattern": "^a+$"}), &json!("b"), "/pattern", r#""b" does not match "^a+$""#)]
    #[test_case(&json!({"minItems": 1}), &json!([]), "/minItems", "[] has less than 1 item")]
    #[test_case(&json!({"maxItems": 1}), &json!([1, 2]), "/maxItems", "[1,2] has more than 1 item")]
    #[test_case(&json!({"minProperties": 1}), &json!({}), "/minProperties", "{} has less than 1 property")]
    #[test_case(&json!({"maxProperties": 0}), &json!({"a": 1}), "/maxProperties", r#"{"a":1} has more than 0 properties"#)]
    #[test_case(&json!({"enum": [1, "a"]}), &json!(2), "/enum", r#"2 is not one of [1,"a"]"#)]
    #[test_case(&json!({"const": {"a": 1}}), &json!({"a": 2}), "/const", r#"{"a":1} was expected"#)]
    #[test_case(&json!({"type": ["string", "null"]}), &json!(1), "/type", r#"1 is not of types "null", "string""#)]
    #[test_case(&json!({"not": {"type": "string"}}), &json!("a"), "/not", r#"{"type":"string"} is not allowed for "a""#)]
    #[test_case(&json!({"contains": {"const": 1}}), &json!([2]), "/contains", "None of [2] are valid under the given schema")]
    #[test_case(&json!(false), &json!(1), "", "False schema does not allow 1")]
    fn single_error(schema: &serde_json::Value, instance: &serde_json::Value, schema_path: &str, message: &str) {
        let error = tests_util::single_error(schema, instance);
        assert_eq!(error.schema_path().as_str(), schema_path);
        assert_eq!(error.to_string(), message);
        tests_util::is_not_valid(schema, instance);
    }

    #[test_case(&json!({"minimum": 5}), &json!("string"))]
    #[test_case(&json!({"minLength": 5}), &json!(1))]
    #[test_case(&json!({"required": ["a"]}), &json!([]))]
    #[test_case(&json!({"items": {"type": "string"}}), &json!({"0": 1}))]
    #[test_case(&json!({"properties": {"a": false}}), &json!("a"))]
    fn keywords_ignore_other_types(schema: &serde_json::Value, instance: &serde_json::Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"exclusiveMinimum": true, "minimum": 5}), &json!(5), false)]
    #[test_case(&json!({"exclusiveMinimum": false, "minimum": 5}), &json!(5), true)]
    #[test_case(&json!({"exclusiveMaximum": true, "maximum": 5}), &json!(5), false)]
    #[test_case(&json!({"exclusiveMaximum": true, "maximum": 5}), &json!(4.9), true)]
    fn draft4_boolean_exclusive_bounds(schema: &serde_json::Value, instance: &serde_json::Value, expected: bool) {
        let validator = tests_util::draft4_validator(schema);
        assert_eq!(validator.is_valid(&crate::JsonValue::from(instance)), expected);
    }

    #[test]
    fn collects_all_failures_of_a_node() {
        let schema = json!({"type": "string", "minimum": 5, "enum": ["a"], "multipleOf": 2});
        let errors = tests_util::errors(&schema, &json!(3));
        let paths: Vec<_> = errors.iter().map(|e| e.schema_path().as_str().to_string()).collect();
        assert_eq!(paths, ["/type", "/minimum", "/enum", "/multipleOf"]);
    }

    #[test]
    fn any_of_reports_branch_errors() {
        let schema = json!({"anyOf": [{"type": "string"}, {"minimum": 10}]});
        let errors = tests_util::errors(&schema, &json!(1));
        let paths: Vec<_> = errors.iter().map(|e| e.schema_path().as_str().to_string()).collect();
        assert_eq!(paths, ["/anyOf", "/anyOf/0/type", "/anyOf/1/minimum"]);
        tests_util::is_valid(&schema, &json!(11));
    }

    #[test]
    fn one_of_multiple_matches_report_count() {
        let schema = json!({"oneOf": [{"type": "integer"}, {"minimum": 0}, {"maximum": 100}]});
        let error = tests_util::single_error(&schema, &json!(5));
        assert!(matches!(
            error.kind(),
            crate::ValidationErrorKind::OneOfMultipleValid { count: 3 }
        ));
    }

    #[test]
    fn conditional_branches() {
        let schema = json!({
            "if": {"type": "string"},
            "then": {"minLength": 2},
            "else": {"minimum": 0}
        });
        tests_util::is_valid(&schema, &json!("ab"));
        tests_util::is_valid(&schema, &json!(3));
        tests_util::assert_schema_location(&schema, &json!("a"), "/then/minLength");
        tests_util::assert_schema_location(&schema, &json!(-1), "/else/minimum");
        let without_else = json!({"if": {"type": "string"}, "then": {"minLength": 2}});
        tests_util::is_valid(&without_else, &json!(-1));
    }

    #[test]
    fn pattern_is_unanchored() {
        let schema = json!({"pattern": "b+"});
        tests_util::is_valid(&schema, &json!("abbbc"));
        tests_util::is_not_valid(&schema, &json!("ac"));
    }

    #[test]
    fn backtrack_limit_is_reported_as_error() {
        let schema = crate::JsonValue::from(json!({"pattern": "^(a+)+\\1$"}));
        let validator = crate::options()
            .with_pattern_options(crate::PatternOptions::fancy_regex().backtrack_limit(10))
            .build(&schema)
            .expect("Valid schema");
        let instance = crate::JsonValue::from("a".repeat(30) + "b");
        let result = validator.validate(&instance);
        let errors = result.errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0].kind(),
            crate::ValidationErrorKind::BacktrackLimitExceeded { .. }
        ));
        assert!(!validator.is_valid(&instance));
    }
}
