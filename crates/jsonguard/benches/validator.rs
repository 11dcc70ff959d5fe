use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use jsonguard::JsonValue;
use serde_json::json;

struct Case {
    name: &'static str,
    schema: serde_json::Value,
    instances: Vec<(&'static str, serde_json::Value)>,
}

fn cases() -> Vec<Case> {
    vec![
        Case {
            name: "person",
            schema: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "minLength": 1},
                    "age": {"type": "integer", "minimum": 0},
                    "email": {"type": "string", "pattern": "^[^@]+@[^@]+$"},
                    "tags": {"type": "array", "items": {"type": "string"}, "uniqueItems": true}
                },
                "required": ["name", "age"],
                "additionalProperties": false
            }),
            instances: vec![
                (
                    "valid",
                    json!({"name": "Alice", "age": 30, "email": "a@b", "tags": ["x", "y"]}),
                ),
                (
                    "invalid",
                    json!({"name": "", "age": -1, "email": "nope", "tags": ["x", "x"], "extra": 1}),
                ),
            ],
        },
        Case {
            name: "tree",
            schema: json!({
                "definitions": {
                    "node": {
                        "type": "object",
                        "properties": {
                            "value": {"type": "integer"},
                            "children": {"type": "array", "items": {"$ref": "#/definitions/node"}}
                        }
                    }
                },
                "$ref": "#/definitions/node"
            }),
            instances: vec![("deep", deep_tree(8)), ("wide", wide_tree(500))],
        },
        Case {
            name: "combinators",
            schema: json!({
                "items": {
                    "oneOf": [
                        {"type": "string", "maxLength": 3},
                        {"type": "number", "multipleOf": 0.5},
                        {"type": "null"}
                    ]
                }
            }),
            instances: vec![(
                "mixed",
                serde_json::Value::Array(
                    (0..1000)
                        .map(|idx| match idx % 3 {
                            0 => json!("abc"),
                            1 => json!(f64::from(idx) / 2.0),
                            _ => json!(null),
                        })
                        .collect(),
                ),
            )],
        },
    ]
}

fn deep_tree(depth: u32) -> serde_json::Value {
    if depth == 0 {
        json!({"value": 0})
    } else {
        json!({"value": depth, "children": [deep_tree(depth - 1), deep_tree(depth - 1)]})
    }
}

fn wide_tree(width: u32) -> serde_json::Value {
    let children: Vec<_> = (0..width).map(|value| json!({"value": value})).collect();
    json!({"value": 0, "children": children})
}

fn bench_build(c: &mut Criterion, name: &str, schema: &JsonValue) {
    c.bench_with_input(BenchmarkId::new("build", name), schema, |b, schema| {
        b.iter_with_large_drop(|| jsonguard::validator_for(schema).expect("Valid schema"));
    });
}

fn bench_is_valid(c: &mut Criterion, name: &str, schema: &JsonValue, instance: &JsonValue) {
    let validator = jsonguard::validator_for(schema).expect("Valid schema");
    c.bench_with_input(
        BenchmarkId::new("is_valid", name),
        instance,
        |b, instance| {
            b.iter(|| black_box(validator.is_valid(instance)));
        },
    );
}

fn bench_validate(c: &mut Criterion, name: &str, schema: &JsonValue, instance: &JsonValue) {
    let validator = jsonguard::validator_for(schema).expect("Valid schema");
    c.bench_with_input(
        BenchmarkId::new("validate", name),
        instance,
        |b, instance| {
            b.iter_with_large_drop(|| validator.validate(instance));
        },
    );
}

fn bench_parse(c: &mut Criterion, name: &str, text: &str) {
    c.bench_with_input(BenchmarkId::new("parse", name), text, |b, text| {
        b.iter_with_large_drop(|| jsonguard::parse_str(text).expect("Valid JSON"));
    });
}

fn run_benchmarks(c: &mut Criterion) {
    for case in cases() {
        let schema = JsonValue::from(&case.schema);
        bench_build(c, case.name, &schema);
        for (instance_name, instance) in &case.instances {
            let name = format!("{}/{instance_name}", case.name);
            bench_parse(c, &name, &instance.to_string());
            let instance = JsonValue::from(instance);
            bench_is_valid(c, &name, &schema, &instance);
            bench_validate(c, &name, &schema, &instance);
        }
    }
}

criterion_group!(benches, run_benchmarks);
criterion_main!(benches);
