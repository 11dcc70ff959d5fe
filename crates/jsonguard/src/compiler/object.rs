use ahash::AHashMap;

use super::{expect_non_negative_integer, expect_subschema, Context};
use crate::{
    node::{AdditionalProperties, Constraint, ConstraintKind, Dependency, Properties},
    value::{JsonValue, Object},
    SchemaError,
};

fn expect_object<'v>(
    ctx: &Context<'_, '_>,
    keyword: &'static str,
    value: &'v JsonValue,
) -> Result<&'v Object, SchemaError> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::invalid_keyword(keyword, ctx.location(), "an object"))
}

fn expect_names(
    ctx: &Context<'_, '_>,
    keyword: &'static str,
    value: &JsonValue,
) -> Result<Box<[String]>, SchemaError> {
    let invalid = || SchemaError::invalid_keyword(keyword, ctx.location(), "an array of strings");
    let JsonValue::Array(items) = value else {
        return Err(invalid());
    };
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

/// `properties`, `patternProperties` and `additionalProperties` as a single constraint, since
/// `additionalProperties` depends on the other two.
pub(super) fn compile_properties(
    ctx: &mut Context<'_, '_>,
    schema: &Object,
) -> Result<Option<Constraint>, SchemaError> {
    let mut properties = AHashMap::new();
    if let Some(value) = schema.get("properties") {
        let location = ctx.keyword_location("properties");
        for (name, subschema) in expect_object(ctx, "properties", value)?.iter() {
            let node = expect_subschema(ctx, "properties", location.join(name), subschema)?;
            properties.insert(name.clone(), node);
        }
    }
    let mut patterns = Vec::new();
    if let Some(value) = schema.get("patternProperties") {
        let location = ctx.keyword_location("patternProperties");
        for (pattern, subschema) in expect_object(ctx, "patternProperties", value)?.iter() {
            let subschema_location = location.join(pattern);
            let compiled = ctx.pattern(pattern, &subschema_location)?;
            let node = expect_subschema(ctx, "patternProperties", subschema_location, subschema)?;
            patterns.push((compiled, node));
        }
    }
    let additional = match schema.get("additionalProperties") {
        None | Some(JsonValue::Bool(true)) => AdditionalProperties::Allowed,
        Some(JsonValue::Bool(false)) => {
            AdditionalProperties::Forbidden(ctx.keyword_location("additionalProperties"))
        }
        Some(value) => {
            let location = ctx.keyword_location("additionalProperties");
            AdditionalProperties::Schema(expect_subschema(
                ctx,
                "additionalProperties",
                location,
                value,
            )?)
        }
    };
    if properties.is_empty()
        && patterns.is_empty()
        && matches!(additional, AdditionalProperties::Allowed)
    {
        return Ok(None);
    }
    Ok(Some(Constraint {
        location: ctx.location().clone(),
        kind: ConstraintKind::Properties(Properties {
            properties,
            patterns: patterns.into_boxed_slice(),
            additional,
        }),
    }))
}

pub(super) fn compile_required(
    ctx: &Context<'_, '_>,
    schema: &Object,
    value: &JsonValue,
) -> Result<Option<Constraint>, SchemaError> {
    let required = expect_names(ctx, "required", value)?;
    if required.is_empty() {
        return Ok(None);
    }
    if let Some(JsonValue::Bool(false)) = schema.get("additionalProperties") {
        check_satisfiable(ctx, schema, &required)?;
    }
    Ok(Some(
        ctx.constraint("required", ConstraintKind::Required(required)),
    ))
}

/// With `additionalProperties: false`, every required name has to be admitted by `properties`
/// or `patternProperties`.
fn check_satisfiable(
    ctx: &Context<'_, '_>,
    schema: &Object,
    required: &[String],
) -> Result<(), SchemaError> {
    let declared = schema.get("properties").and_then(JsonValue::as_object);
    let mut patterns = Vec::new();
    if let Some(object) = schema.get("patternProperties").and_then(JsonValue::as_object) {
        let location = ctx.keyword_location("patternProperties");
        for pattern in object.keys() {
            patterns.push(ctx.pattern(pattern, &location.join(pattern))?);
        }
    }
    for property in required {
        let is_declared = declared.is_some_and(|object| object.contains_key(property));
        // A pattern that gives up on backtracking is assumed to admit the name
        let is_matched = patterns
            .iter()
            .any(|pattern| pattern.is_match(property).unwrap_or(true));
        if !is_declared && !is_matched {
            return Err(SchemaError::UnsatisfiableRequired {
                property: property.clone(),
                location: ctx.keyword_location("required"),
            });
        }
    }
    Ok(())
}

pub(super) fn compile_property_names(
    ctx: &mut Context<'_, '_>,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let location = ctx.keyword_location("propertyNames");
    let node = expect_subschema(ctx, "propertyNames", location.clone(), value)?;
    Ok(Constraint {
        location,
        kind: ConstraintKind::PropertyNames(node),
    })
}

pub(super) fn compile_min_properties(
    ctx: &Context<'_, '_>,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let limit = expect_non_negative_integer(ctx, "minProperties", value)?;
    Ok(ctx.constraint("minProperties", ConstraintKind::MinProperties(limit)))
}

pub(super) fn compile_max_properties(
    ctx: &Context<'_, '_>,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let limit = expect_non_negative_integer(ctx, "maxProperties", value)?;
    Ok(ctx.constraint("maxProperties", ConstraintKind::MaxProperties(limit)))
}

pub(super) fn compile_dependencies(
    ctx: &mut Context<'_, '_>,
    value: &JsonValue,
) -> Result<Option<Constraint>, SchemaError> {
    let location = ctx.keyword_location("dependencies");
    let mut dependencies = Vec::new();
    for (name, dependency) in expect_object(ctx, "dependencies", value)?.iter() {
        let dependency_location = location.join(name);
        let dependency = match dependency {
            JsonValue::Array(_) => Dependency::Properties {
                names: expect_names(ctx, "dependencies", dependency)?,
                location: dependency_location,
            },
            _ => Dependency::Schema(expect_subschema(
                ctx,
                "dependencies",
                dependency_location,
                dependency,
            )?),
        };
        dependencies.push((name.clone(), dependency));
    }
    if dependencies.is_empty() {
        return Ok(None);
    }
    Ok(Some(Constraint {
        location,
        kind: ConstraintKind::Dependencies(dependencies.into_boxed_slice()),
    }))
}

#[cfg(test)]
mod tests {
    use crate::{JsonValue, SchemaError};
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!({"properties": {"a": {}}, "required": ["a"], "additionalProperties": false}); "declared")]
    #[test_case(json!({"patternProperties": {"^x-": {}}, "required": ["x-a"], "additionalProperties": false}); "pattern")]
    #[test_case(json!({"required": ["a"], "additionalProperties": {"type": "string"}}); "additional schema")]
    #[test_case(json!({"required": ["a"]}); "no additional properties")]
    fn satisfiable_required(schema: serde_json::Value) {
        assert!(crate::validator_for(&JsonValue::from(schema)).is_ok());
    }

    #[test]
    fn unsatisfiable_required() {
        let schema = JsonValue::from(json!({
            "properties": {"a": {}},
            "patternProperties": {"^x-": {}},
            "required": ["a", "b"],
            "additionalProperties": false
        }));
        match crate::validator_for(&schema).expect_err("Unsatisfiable") {
            SchemaError::UnsatisfiableRequired { property, location } => {
                assert_eq!(property, "b");
                assert_eq!(location.as_str(), "/required");
            }
            error => panic!("Unexpected error: {error}"),
        }
    }
}
