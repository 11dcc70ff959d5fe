//! Combinators and conditionals.
use super::{expect_subschema, Context};
use crate::{
    node::{Constraint, ConstraintKind, NodeId},
    value::{JsonValue, Object},
    SchemaError,
};

fn compile_branches(
    ctx: &mut Context<'_, '_>,
    keyword: &'static str,
    value: &JsonValue,
) -> Result<Box<[NodeId]>, SchemaError> {
    let JsonValue::Array(schemas) = value else {
        return Err(SchemaError::invalid_keyword(
            keyword,
            ctx.location(),
            "an array of schemas",
        ));
    };
    let location = ctx.keyword_location(keyword);
    let mut nodes = Vec::with_capacity(schemas.len());
    for (idx, schema) in schemas.iter().enumerate() {
        nodes.push(expect_subschema(ctx, keyword, location.join(idx), schema)?);
    }
    Ok(nodes.into_boxed_slice())
}

pub(super) fn compile_all_of(
    ctx: &mut Context<'_, '_>,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let nodes = compile_branches(ctx, "allOf", value)?;
    Ok(ctx.constraint("allOf", ConstraintKind::AllOf(nodes)))
}

pub(super) fn compile_any_of(
    ctx: &mut Context<'_, '_>,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let nodes = compile_branches(ctx, "anyOf", value)?;
    Ok(ctx.constraint("anyOf", ConstraintKind::AnyOf(nodes)))
}

pub(super) fn compile_one_of(
    ctx: &mut Context<'_, '_>,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let nodes = compile_branches(ctx, "oneOf", value)?;
    Ok(ctx.constraint("oneOf", ConstraintKind::OneOf(nodes)))
}

pub(super) fn compile_not(
    ctx: &mut Context<'_, '_>,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let location = ctx.keyword_location("not");
    let node = expect_subschema(ctx, "not", location.clone(), value)?;
    Ok(Constraint {
        location,
        kind: ConstraintKind::Not {
            node,
            schema: value.clone(),
        },
    })
}

fn compile_branch(
    ctx: &mut Context<'_, '_>,
    schema: &Object,
    keyword: &'static str,
) -> Result<Option<NodeId>, SchemaError> {
    match schema.get(keyword) {
        Some(value) => {
            let location = ctx.keyword_location(keyword);
            expect_subschema(ctx, keyword, location, value).map(Some)
        }
        None => Ok(None),
    }
}

/// `then` and `else` have no effect without `if`.
pub(super) fn compile_if(
    ctx: &mut Context<'_, '_>,
    schema: &Object,
    value: &JsonValue,
) -> Result<Constraint, SchemaError> {
    let location = ctx.keyword_location("if");
    let condition = expect_subschema(ctx, "if", location.clone(), value)?;
    let then = compile_branch(ctx, schema, "then")?;
    let otherwise = compile_branch(ctx, schema, "else")?;
    Ok(Constraint {
        location,
        kind: ConstraintKind::Conditional {
            condition,
            then,
            otherwise,
        },
    })
}
