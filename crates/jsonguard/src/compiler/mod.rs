//! Two-pass schema compilation.
//!
//! The [`registry`] indexes every document first; then subschemas are compiled into arena slots
//! through a work queue. A subschema is keyed by its document and location, so each `$ref`
//! target is compiled once and shared, and cycles become indices into the arena.
mod any;
mod array;
mod logic;
mod numeric;
mod object;
pub(crate) mod registry;
mod string;

use std::{collections::VecDeque, sync::Arc};

use ahash::AHashMap;

use crate::{
    draft::Draft,
    node::{CompiledSchema, Constraint, ConstraintKind, NodeId, NodeKind, SchemaNode},
    options::{PatternOptions, ValidationOptions},
    paths::Location,
    regex::Pattern,
    value::{JsonValue, Number, Object},
    SchemaError,
};
use registry::{parse_uri, DocumentId, Registry, DEFAULT_ROOT_URI};

/// Compile `schema` into an immutable arena of nodes.
pub(crate) fn compile(
    schema: &JsonValue,
    draft: Draft,
    options: &ValidationOptions,
) -> Result<CompiledSchema, SchemaError> {
    let mut registry = Registry::new(draft, options.retriever());
    let base = parse_uri(options.base_uri().unwrap_or(DEFAULT_ROOT_URI))?;
    let root = registry.add_document(base, Arc::new(schema.clone()), draft)?;
    for (uri, contents) in options.resources() {
        let resource_draft = Draft::detect(contents)?.unwrap_or(draft);
        registry.add_document(parse_uri(uri)?, Arc::new(contents.clone()), resource_draft)?;
    }
    let mut compiler = Compiler {
        registry,
        pattern_options: options.pattern_options(),
        nodes: Vec::new(),
        scheduled: AHashMap::new(),
        queue: VecDeque::new(),
    };
    let root = compiler.schedule(root, Location::new());
    compiler.run()?;
    tracing::debug!(
        nodes = compiler.nodes.len(),
        documents = compiler.registry.len(),
        ?draft,
        "Compiled schema"
    );
    Ok(CompiledSchema::new(compiler.nodes, root))
}

struct Compiler<'o> {
    registry: Registry<'o>,
    pattern_options: &'o PatternOptions,
    nodes: Vec<SchemaNode>,
    scheduled: AHashMap<(DocumentId, Location), NodeId>,
    queue: VecDeque<(DocumentId, Location, NodeId)>,
}

impl Compiler<'_> {
    /// Reserve an arena slot for the subschema at `location`, compiling it later.
    fn schedule(&mut self, document: DocumentId, location: Location) -> NodeId {
        if let Some(id) = self.scheduled.get(&(document, location.clone())) {
            return *id;
        }
        let id = NodeId::new(self.nodes.len());
        // Placeholder until the queue reaches this slot
        self.nodes.push(SchemaNode {
            location: location.clone(),
            kind: NodeKind::AlwaysValid,
        });
        self.scheduled.insert((document, location.clone()), id);
        self.queue.push_back((document, location, id));
        id
    }

    fn run(&mut self) -> Result<(), SchemaError> {
        while let Some((document, location, id)) = self.queue.pop_front() {
            let kind = self.compile_node(document, &location)?;
            self.nodes[id.index()].kind = kind;
        }
        Ok(())
    }

    fn compile_node(
        &mut self,
        document: DocumentId,
        location: &Location,
    ) -> Result<NodeKind, SchemaError> {
        let contents = self.registry.contents(document);
        let Some(schema) = contents.pointer(location.as_str()) else {
            return Err(SchemaError::InvalidSchema {
                location: location.clone(),
                reason: "no value at this location".to_string(),
            });
        };
        match schema {
            JsonValue::Bool(true) => Ok(NodeKind::AlwaysValid),
            JsonValue::Bool(false) => Ok(NodeKind::AlwaysInvalid),
            JsonValue::Object(object) => {
                if let Some(reference) = object.get("$ref") {
                    return self.compile_reference(document, location, reference);
                }
                let draft = self.registry.draft(document);
                let mut ctx = Context {
                    compiler: self,
                    document,
                    location,
                    draft,
                };
                let constraints = compile_keywords(&mut ctx, object)?;
                if constraints.is_empty() {
                    Ok(NodeKind::AlwaysValid)
                } else {
                    Ok(NodeKind::Constraints(constraints.into_boxed_slice()))
                }
            }
            _ => Err(SchemaError::InvalidSchema {
                location: location.clone(),
                reason: format!(
                    "expected an object or a boolean, got {}",
                    schema.json_type()
                ),
            }),
        }
    }

    fn compile_reference(
        &mut self,
        document: DocumentId,
        location: &Location,
        reference: &JsonValue,
    ) -> Result<NodeKind, SchemaError> {
        let JsonValue::String(reference) = reference else {
            return Err(SchemaError::invalid_keyword("$ref", location, "a string"));
        };
        let keyword_location = location.join("$ref");
        let base = self.registry.base_of(document, location);
        let (target_document, target) =
            self.registry
                .resolve(&base, reference, &keyword_location)?;
        let target = self.schedule(target_document, target);
        Ok(NodeKind::Constraints(
            vec![Constraint {
                location: keyword_location,
                kind: ConstraintKind::Reference(target),
            }]
            .into_boxed_slice(),
        ))
    }
}

/// Compilation state for a single schema object.
pub(crate) struct Context<'a, 'o> {
    compiler: &'a mut Compiler<'o>,
    document: DocumentId,
    location: &'a Location,
    draft: Draft,
}

impl Context<'_, '_> {
    pub(crate) fn draft(&self) -> Draft {
        self.draft
    }

    pub(crate) fn location(&self) -> &Location {
        self.location
    }

    pub(crate) fn keyword_location(&self, keyword: &str) -> Location {
        self.location.join(keyword)
    }

    /// Schedule the subschema at `location` and return its arena slot.
    pub(crate) fn subschema(&mut self, location: Location) -> NodeId {
        self.compiler.schedule(self.document, location)
    }

    pub(crate) fn pattern(
        &self,
        pattern: &str,
        location: &Location,
    ) -> Result<Pattern, SchemaError> {
        Pattern::new(pattern, self.compiler.pattern_options).map_err(|reason| {
            SchemaError::InvalidPattern {
                pattern: pattern.to_string(),
                location: location.clone(),
                reason,
            }
        })
    }

    pub(crate) fn constraint(&self, keyword: &str, kind: ConstraintKind) -> Constraint {
        Constraint {
            location: self.keyword_location(keyword),
            kind,
        }
    }
}

/// Compile the keywords of a schema object in their declaration order.
fn compile_keywords(
    ctx: &mut Context<'_, '_>,
    schema: &Object,
) -> Result<Vec<Constraint>, SchemaError> {
    let draft = ctx.draft();
    let mut constraints = Vec::with_capacity(schema.len());
    let mut items_done = false;
    let mut properties_done = false;
    for (keyword, value) in schema.iter() {
        let constraint = match keyword.as_str() {
            "type" => Some(any::compile_type(ctx, value)?),
            "enum" => Some(any::compile_enum(ctx, value)?),
            "const" if draft.supports_const() => Some(any::compile_const(ctx, value)),
            "minimum" => Some(numeric::compile_minimum(ctx, schema, value)?),
            "maximum" => Some(numeric::compile_maximum(ctx, schema, value)?),
            "exclusiveMinimum" => numeric::compile_exclusive_minimum(ctx, value)?,
            "exclusiveMaximum" => numeric::compile_exclusive_maximum(ctx, value)?,
            "multipleOf" => Some(numeric::compile_multiple_of(ctx, value)?),
            "minLength" => Some(string::compile_min_length(ctx, value)?),
            "maxLength" => Some(string::compile_max_length(ctx, value)?),
            "pattern" => Some(string::compile_pattern(ctx, value)?),
            "items" | "additionalItems" if !items_done => {
                items_done = true;
                array::compile_items(ctx, schema)?
            }
            "minItems" => Some(array::compile_min_items(ctx, value)?),
            "maxItems" => Some(array::compile_max_items(ctx, value)?),
            "uniqueItems" => array::compile_unique_items(ctx, value)?,
            "contains" if draft.supports_contains() => Some(array::compile_contains(ctx, value)?),
            "properties" | "patternProperties" | "additionalProperties" if !properties_done => {
                properties_done = true;
                object::compile_properties(ctx, schema)?
            }
            "required" => object::compile_required(ctx, schema, value)?,
            "propertyNames" if draft.supports_property_names() => {
                Some(object::compile_property_names(ctx, value)?)
            }
            "minProperties" => Some(object::compile_min_properties(ctx, value)?),
            "maxProperties" => Some(object::compile_max_properties(ctx, value)?),
            "dependencies" => object::compile_dependencies(ctx, value)?,
            "allOf" => Some(logic::compile_all_of(ctx, value)?),
            "anyOf" => Some(logic::compile_any_of(ctx, value)?),
            "oneOf" => Some(logic::compile_one_of(ctx, value)?),
            "not" => Some(logic::compile_not(ctx, value)?),
            "if" if draft.supports_conditionals() => Some(logic::compile_if(ctx, schema, value)?),
            "definitions" => {
                if !matches!(value, JsonValue::Object(_)) {
                    return Err(SchemaError::invalid_keyword(
                        "definitions",
                        ctx.location(),
                        "an object",
                    ));
                }
                None
            }
            _ => None,
        };
        constraints.extend(constraint);
    }
    check_bounds(ctx, schema)?;
    Ok(constraints)
}

/// Lower bounds must not exceed their upper bound counterparts.
fn check_bounds(ctx: &Context<'_, '_>, schema: &Object) -> Result<(), SchemaError> {
    let mut pairs = vec![
        ("minimum", "maximum"),
        ("minLength", "maxLength"),
        ("minItems", "maxItems"),
        ("minProperties", "maxProperties"),
    ];
    if !ctx.draft().has_boolean_exclusive_bounds() {
        pairs.push(("exclusiveMinimum", "exclusiveMaximum"));
    }
    for (lower, upper) in pairs {
        if let (Some(low), Some(high)) = (
            schema.get(lower).and_then(JsonValue::as_f64),
            schema.get(upper).and_then(JsonValue::as_f64),
        ) {
            if low > high {
                return Err(SchemaError::InvalidBounds {
                    lower,
                    upper,
                    location: ctx.location().clone(),
                });
            }
        }
    }
    Ok(())
}

pub(crate) fn expect_number(
    ctx: &Context<'_, '_>,
    keyword: &'static str,
    value: &JsonValue,
) -> Result<Number, SchemaError> {
    value
        .as_number()
        .ok_or_else(|| SchemaError::invalid_keyword(keyword, ctx.location(), "a number"))
}

pub(crate) fn expect_non_negative_integer(
    ctx: &Context<'_, '_>,
    keyword: &'static str,
    value: &JsonValue,
) -> Result<u64, SchemaError> {
    match value.as_number() {
        Some(number) if number.is_integer() && number.as_f64() >= 0.0 => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Ok(number.as_f64() as u64)
        }
        _ => Err(SchemaError::invalid_keyword(
            keyword,
            ctx.location(),
            "a non-negative integer",
        )),
    }
}

/// Schedule a subschema, checking that `value` can be one.
pub(crate) fn expect_subschema(
    ctx: &mut Context<'_, '_>,
    keyword: &'static str,
    location: Location,
    value: &JsonValue,
) -> Result<NodeId, SchemaError> {
    match value {
        JsonValue::Bool(_) | JsonValue::Object(_) => Ok(ctx.subschema(location)),
        _ => Err(SchemaError::InvalidSchema {
            location,
            reason: format!(
                "'{keyword}' expects an object or a boolean, got {}",
                value.json_type()
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::{tests_util, JsonValue, SchemaError};
    use serde_json::json;
    use test_case::test_case;

    fn compile_error(schema: serde_json::Value) -> SchemaError {
        crate::validator_for(&JsonValue::from(schema)).expect_err("Invalid schema")
    }

    #[test_case(json!({"minimum": 5, "maximum": 1}), "minimum", "maximum")]
    #[test_case(json!({"minLength": 3, "maxLength": 2}), "minLength", "maxLength")]
    #[test_case(json!({"minItems": 3, "maxItems": 2}), "minItems", "maxItems")]
    #[test_case(json!({"minProperties": 3, "maxProperties": 2}), "minProperties", "maxProperties")]
    #[test_case(json!({"exclusiveMinimum": 3, "exclusiveMaximum": 2}), "exclusiveMinimum", "exclusiveMaximum")]
    fn bounds_must_be_ordered(schema: serde_json::Value, low: &str, high: &str) {
        match compile_error(schema) {
            SchemaError::InvalidBounds { lower, upper, .. } => {
                assert_eq!(lower, low);
                assert_eq!(upper, high);
            }
            error => panic!("Unexpected error: {error}"),
        }
    }

    #[test_case(json!({"minLength": -1}); "negative length")]
    #[test_case(json!({"maxItems": 1.5}); "fractional count")]
    #[test_case(json!({"multipleOf": 0}); "zero multiple")]
    #[test_case(json!({"multipleOf": -2}); "negative multiple")]
    #[test_case(json!({"minimum": "1"}); "string bound")]
    #[test_case(json!({"type": "text"}); "unknown type")]
    #[test_case(json!({"type": [1]}); "non-string type")]
    #[test_case(json!({"enum": {}}); "enum object")]
    #[test_case(json!({"required": "a"}); "required string")]
    #[test_case(json!({"required": [1]}); "required number")]
    #[test_case(json!({"properties": []}); "properties array")]
    #[test_case(json!({"allOf": {}}); "allOf object")]
    #[test_case(json!({"uniqueItems": 1}); "uniqueItems number")]
    #[test_case(json!({"$ref": 1}); "ref number")]
    #[test_case(json!({"definitions": 1}); "definitions number")]
    fn invalid_keyword_values(schema: serde_json::Value) {
        assert!(matches!(
            compile_error(schema),
            SchemaError::InvalidKeyword { .. }
        ));
    }

    #[test]
    fn non_schema_values_are_rejected() {
        let error = compile_error(json!({"properties": {"a": 5}}));
        match error {
            SchemaError::InvalidSchema { location, .. } => {
                assert_eq!(location.as_str(), "/properties/a");
            }
            error => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn invalid_regex() {
        assert!(matches!(
            compile_error(json!({"pattern": "(unclosed"})),
            SchemaError::InvalidPattern { .. }
        ));
        assert!(matches!(
            compile_error(json!({"patternProperties": {"[a-": {}}})),
            SchemaError::InvalidPattern { .. }
        ));
    }

    #[test]
    fn unresolved_reference() {
        match compile_error(json!({"properties": {"a": {"$ref": "#/definitions/missing"}}})) {
            SchemaError::UnresolvedRef {
                reference,
                location,
            } => {
                assert_eq!(reference, "#/definitions/missing");
                assert_eq!(location.as_str(), "/properties/a/$ref");
            }
            error => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn unknown_draft() {
        assert!(matches!(
            compile_error(json!({"$schema": "https://json-schema.org/draft/2020-12/schema"})),
            SchemaError::UnknownDraft { .. }
        ));
    }

    #[test]
    fn shared_targets_compile_once() {
        let schema = JsonValue::from(json!({
            "properties": {
                "a": {"$ref": "#/definitions/x"},
                "b": {"$ref": "#/definitions/x"}
            },
            "definitions": {"x": {"type": "integer"}}
        }));
        let validator = crate::validator_for(&schema).expect("Valid schema");
        // root, two properties and the shared target
        assert_eq!(validator.schema().len(), 4);
    }

    #[test]
    fn unused_definitions_are_not_compiled() {
        let schema = JsonValue::from(json!({
            "definitions": {"unused": {"type": "integer"}},
            "type": "string"
        }));
        let validator = crate::validator_for(&schema).expect("Valid schema");
        assert_eq!(validator.schema().len(), 1);
    }

    #[test]
    fn ref_overrides_siblings() {
        tests_util::is_valid(
            &json!({
                "definitions": {"s": {"type": "string"}},
                "properties": {
                    "a": {"$ref": "#/definitions/s", "maxLength": 1}
                }
            }),
            &json!({"a": "long string"}),
        );
    }
}
