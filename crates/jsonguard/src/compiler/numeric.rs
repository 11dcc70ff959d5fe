use super::{expect_number, Context};
use crate::{
    node::{Constraint, ConstraintKind},
    value::{JsonValue, Object},
    SchemaError,
};

/// Draft 4 spells exclusive bounds as a boolean flag next to `minimum`/`maximum`.
fn exclusive_flag(
    ctx: &Context<'_, '_>,
    schema: &Object,
    keyword: &'static str,
) -> Result<bool, SchemaError> {
    if !ctx.draft().has_boolean_exclusive_bounds() {
        return Ok(false);
    }
    match schema.get(keyword) {
        None => Ok(false),
        Some(JsonValue::Bool(flag)) => Ok(*flag),
        Some(_) => Err(SchemaError::invalid_keyword(
            keyword,
            ctx.location(),
            "a boolean",
        )),
    }
}

pub(super) fn compile_minimum(
    ctx: &Context<'_, '_>,
    schema: &Object,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let limit = expect_number(ctx, "minimum", value)?;
    let exclusive = exclusive_flag(ctx, schema, "exclusiveMinimum")?;
    Ok(ctx.constraint("minimum", ConstraintKind::Minimum { limit, exclusive }))
}

pub(super) fn compile_maximum(
    ctx: &Context<'_, '_>,
    schema: &Object,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let limit = expect_number(ctx, "maximum", value)?;
    let exclusive = exclusive_flag(ctx, schema, "exclusiveMaximum")?;
    Ok(ctx.constraint("maximum", ConstraintKind::Maximum { limit, exclusive }))
}

pub(super) fn compile_exclusive_minimum(
    ctx: &Context<'_, '_>,
    value: &JsonValue,
) -> Result<Option<Constraint>, SchemaError> {
    if ctx.draft().has_boolean_exclusive_bounds() {
        // Checked together with `minimum`
        return Ok(None);
    }
    let limit = expect_number(ctx, "exclusiveMinimum", value)?;
    Ok(Some(ctx.constraint(
        "exclusiveMinimum",
        ConstraintKind::Minimum {
            limit,
            exclusive: true,
        },
    )))
}

pub(super) fn compile_exclusive_maximum(
    ctx: &Context<'_, '_>,
    value: &JsonValue,
) -> Result<Option<Constraint>, SchemaError> {
    if ctx.draft().has_boolean_exclusive_bounds() {
        return Ok(None);
    }
    let limit = expect_number(ctx, "exclusiveMaximum", value)?;
    Ok(Some(ctx.constraint(
        "exclusiveMaximum",
        ConstraintKind::Maximum {
            limit,
            exclusive: true,
        },
    )))
}

pub(super) fn compile_multiple_of(
    ctx: &Context<'_, '_>,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    match value.as_number() {
        Some(multiple_of) if multiple_of.as_f64() > 0.0 => Ok(ctx.constraint(
            "multipleOf",
            ConstraintKind::MultipleOf(multiple_of),
        )),
        _ => Err(SchemaError::invalid_keyword(
            "multipleOf",
            ctx.location(),
            "a number greater than 0",
        )),
    }
}
