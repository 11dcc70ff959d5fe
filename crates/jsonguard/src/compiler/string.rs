use super::{expect_non_negative_integer, Context};
use crate::{
    node::{Constraint, ConstraintKind},
    value::JsonValue,
    SchemaError,
};

pub(super) fn compile_min_length(
    ctx: &Context<'_, '_>,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let limit = expect_non_negative_integer(ctx, "minLength", value)?;
    Ok(ctx.constraint("minLength", ConstraintKind::MinLength(limit)))
}

pub(super) fn compile_max_length(
    ctx: &Context<'_, '_>,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let limit = expect_non_negative_integer(ctx, "maxLength", value)?;
    Ok(ctx.constraint("maxLength", ConstraintKind::MaxLength(limit)))
}

pub(super) fn compile_pattern(
    ctx: &Context<'_, '_>,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let JsonValue::String(pattern) = value else {
        return Err(SchemaError::invalid_keyword(
            "pattern",
            ctx.location(),
            "a string",
        ));
    };
    let location = ctx.keyword_location("pattern");
    let pattern = ctx.pattern(pattern, &location)?;
    Ok(Constraint {
        location,
        kind: ConstraintKind::Pattern(pattern),
    })
}
