//! Property-based tests for model resolution and generation

use proptest::prelude::*;
use sdk_codegen::codegen::generate_models;
use sdk_codegen::{ApiModel, GeneratorRegistry, MethodContract};
use serde_json::{json, Map, Value};

fn document(schemas: Value, paths: Value) -> String {
    json!({
        "openapi": "3.0.0",
        "info": { "title": "Generated", "version": "1.0" },
        "paths": paths,
        "components": { "schemas": schemas }
    })
    .to_string()
}

/// Shape of one named schema `Ti`; indices refer to other schemas
#[derive(Debug, Clone)]
enum Shape {
    Object(Vec<usize>),
    Array(usize),
    Hash(usize),
}

fn schema_graph() -> impl Strategy<Value = Vec<Shape>> {
    (1usize..6).prop_flat_map(|count| {
        let shape = prop_oneof![
            3 => prop::collection::vec(0..count, 0..4).prop_map(Shape::Object),
            1 => (0..count).prop_map(Shape::Array),
            1 => (0..count).prop_map(Shape::Hash),
        ];
        prop::collection::vec(shape, count)
    })
}

fn reference(target: usize) -> Value {
    json!({ "$ref": format!("#/components/schemas/T{}", target) })
}

fn schemas_for(graph: &[Shape]) -> Value {
    let mut schemas = Map::new();
    for (index, shape) in graph.iter().enumerate() {
        let schema = match shape {
            Shape::Object(targets) => {
                let mut properties = Map::new();
                properties.insert("id".to_string(), json!({ "type": "string", "readOnly": true }));
                for (slot, target) in targets.iter().enumerate() {
                    let schema = if slot % 2 == 0 {
                        reference(*target)
                    } else {
                        json!({ "type": "array", "items": reference(*target) })
                    };
                    properties.insert(format!("p{}", slot), schema);
                }
                json!({ "type": "object", "properties": properties })
            }
            Shape::Array(target) => json!({ "type": "array", "items": reference(*target) }),
            Shape::Hash(target) => json!({ "type": "object", "additionalProperties": reference(*target) }),
        };
        schemas.insert(format!("T{}", index), schema);
    }
    Value::Object(schemas)
}

fn is_self_loop(index: usize, shape: &Shape) -> bool {
    match shape {
        Shape::Object(targets) => targets.contains(&index),
        Shape::Array(target) | Shape::Hash(target) => *target == index,
    }
}

/// Property: parameters are required-first, otherwise in declaration order,
/// and none are lost or duplicated.
#[test]
fn prop_all_params_required_first() {
    proptest!(|(required in prop::collection::vec(any::<bool>(), 0..8), with_body in any::<bool>())| {
        let params: Vec<Value> = required
            .iter()
            .enumerate()
            .map(|(i, r)| json!({ "name": format!("q{}", i), "in": "query", "required": r, "schema": { "type": "string" } }))
            .collect();
        let mut operation = json!({
            "operationId": "op",
            "parameters": params,
            "responses": { "204": { "description": "none" } }
        });
        if with_body {
            operation["requestBody"] = json!({ "content": { "application/json": { "schema": { "type": "string" } } } });
        }
        let api = ApiModel::from_json(&document(json!({}), json!({ "/op": { "post": operation } }))).unwrap();
        let method = api.method("op").unwrap();
        let ordered = method.all_params();

        prop_assert_eq!(ordered.len(), required.len() + usize::from(with_body));
        let first_optional = ordered.iter().position(|p| !p.required).unwrap_or(ordered.len());
        prop_assert!(ordered[first_optional..].iter().all(|p| !p.required));

        let mut expected: Vec<&str> = Vec::new();
        for want in [true, false] {
            for param in &method.params {
                if param.required == want {
                    expected.push(param.name.as_str());
                }
            }
        }
        let actual: Vec<&str> = ordered.iter().map(|p| p.name.as_str()).collect();
        prop_assert_eq!(actual, expected);
    });
}

/// Property: `pick_type` unwraps exactly one collection level.
#[test]
fn prop_pick_type_unwraps_one_level() {
    proptest!(|(depth in 0usize..5)| {
        let mut schema = json!({ "type": "integer", "format": "int64" });
        for _ in 0..depth {
            schema = json!({ "type": "array", "items": schema });
        }
        let schemas = json!({ "Holder": { "type": "object", "properties": { "value": schema } } });
        let api = ApiModel::from_json(&document(schemas, json!({}))).unwrap();

        let holder = api.type_by_name("Holder").unwrap();
        let name = &holder.property("value").unwrap().type_name;
        prop_assert_eq!(name.clone(), format!("int64{}", "[]".repeat(depth)));

        let ty = api.type_by_name(name).unwrap();
        let picked = api.pick_type(ty);
        let expected = format!("int64{}", "[]".repeat(depth.saturating_sub(1)));
        prop_assert_eq!(&picked.name, &expected);
        prop_assert_eq!(api.base_type(ty).name.as_str(), "int64");
    });
}

/// Property: resolving the same document twice gives the same model, and
/// every generator terminates on arbitrary reference cycles, including
/// cycles through named array and map schemas.
#[test]
fn prop_cyclic_graphs_resolve_and_generate() {
    proptest!(ProptestConfig::with_cases(64), |(graph in schema_graph())| {
        let text = document(schemas_for(&graph), json!({}));
        let a = ApiModel::from_json(&text).unwrap();
        let b = ApiModel::from_json(&text).unwrap();
        prop_assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());

        for (index, shape) in graph.iter().enumerate() {
            let ty = a.type_by_name(&format!("T{}", index)).unwrap();
            if is_self_loop(index, shape) {
                prop_assert!(ty.recursive);
            }
            let base = a.base_type(ty);
            prop_assert!(a.type_by_name(&base.name).is_some());
        }

        let registry = GeneratorRegistry::default();
        for generator in registry.iter() {
            let file = generate_models(generator, &a, true).unwrap();
            prop_assert!(file.skipped.is_empty());
            prop_assert!(file.code.contains("T0"));
        }
    });
}
