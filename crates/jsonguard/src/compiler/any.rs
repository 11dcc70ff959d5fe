//! Keywords applicable to instances of any type.
use super::Context;
use crate::{
    node::{Constraint, ConstraintKind},
    types::{JsonType, JsonTypeSet},
    value::JsonValue,
    SchemaError,
};

pub(super) fn compile_type(
    ctx: &Context<'_, '_>,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let parse = |name: &JsonValue| -> Result<JsonType, SchemaError> {
        name.as_str()
            .and_then(|name| name.parse().ok())
            .ok_or_else(|| {
                SchemaError::invalid_keyword("type", ctx.location(), "a known type name")
            })
    };
    let types = match value {
        JsonValue::String(_) => JsonTypeSet::empty().insert(parse(value)?),
        JsonValue::Array(names) => {
            let mut types = JsonTypeSet::empty();
            for name in names {
                types = types.insert(parse(name)?);
            }
            types
        }
        _ => {
            return Err(SchemaError::invalid_keyword(
                "type",
                ctx.location(),
                "a type name or an array of type names",
            ))
        }
    };
    Ok(ctx.constraint("type", ConstraintKind::Type(types)))
}

pub(super) fn compile_enum(
    ctx: &Context<'_, '_>,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    match value {
        JsonValue::Array(options) => Ok(ctx.constraint(
            "enum",
            ConstraintKind::Enum(options.clone().into_boxed_slice()),
        )),
        _ => Err(SchemaError::invalid_keyword(
            "enum",
            ctx.location(),
            "an array",
        )),
    }
}

pub(super) fn compile_const(ctx: &Context<'_, '_>, value: &JsonValue) -> Constraint {
    ctx.constraint("const", ConstraintKind::Const(value.clone()))
}
