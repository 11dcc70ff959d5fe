use super::{expect_non_negative_integer, expect_subschema, Context};
use crate::{
    node::{AdditionalItems, Constraint, ConstraintKind, Items},
    value::{JsonValue, Object},
    SchemaError,
};

/// `items` together with `additionalItems`, which only matters for the tuple form.
pub(super) fn compile_items(
    ctx: &mut Context<'_, '_>,
    schema: &Object,
) -> Result<Option<Constraint>, SchemaError> {
    let Some(items) = schema.get("items") else {
        return Ok(None);
    };
    let location = ctx.keyword_location("items");
    let items = match items {
        JsonValue::Array(schemas) => {
            let mut nodes = Vec::with_capacity(schemas.len());
            for (idx, item) in schemas.iter().enumerate() {
                nodes.push(expect_subschema(ctx, "items", location.join(idx), item)?);
            }
            let additional = match schema.get("additionalItems") {
                None | Some(JsonValue::Bool(true)) => AdditionalItems::Allowed,
                Some(JsonValue::Bool(false)) => {
                    AdditionalItems::Forbidden(ctx.keyword_location("additionalItems"))
                }
                Some(value) => {
                    let location = ctx.keyword_location("additionalItems");
                    AdditionalItems::Schema(expect_subschema(ctx, "additionalItems", location, value)?)
                }
            };
            Items::Tuple {
                nodes: nodes.into_boxed_slice(),
                additional,
            }
        }
        value => Items::Single(expect_subschema(ctx, "items", location.clone(), value)?),
    };
    Ok(Some(Constraint {
        location,
        kind: ConstraintKind::Items(items),
    }))
}

pub(super) fn compile_min_items(
    ctx: &Context<'_, '_>,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let limit = expect_non_negative_integer(ctx, "minItems", value)?;
    Ok(ctx.constraint("minItems", ConstraintKind::MinItems(limit)))
}

pub(super) fn compile_max_items(
    ctx: &Context<'_, '_>,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let limit = expect_non_negative_integer(ctx, "maxItems", value)?;
    Ok(ctx.constraint("maxItems", ConstraintKind::MaxItems(limit)))
}

pub(super) fn compile_unique_items(
    ctx: &Context<'_, '_>,
    value: &JsonValue,
) -> Result<Option<Constraint>, SchemaError> {
    match value {
        JsonValue::Bool(true) => Ok(Some(
            ctx.constraint("uniqueItems", ConstraintKind::UniqueItems),
        )),
        JsonValue::Bool(false) => Ok(None),
        _ => Err(SchemaError::invalid_keyword(
            "uniqueItems",
            ctx.location(),
            "a boolean",
        )),
    }
}

pub(super) fn compile_contains(
    ctx: &mut Context<'_, '_>,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let location = ctx.keyword_location("contains");
    let node = expect_subschema(ctx, "contains", location.clone(), value)?;
    Ok(Constraint {
        location,
        kind: ConstraintKind::Contains(node),
    })
}
