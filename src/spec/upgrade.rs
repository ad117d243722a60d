//! Shape upgrades applied before deserializing into [`IntermediateSpec`]
//!
//! Works on raw `serde_json::Value` trees so that legacy documents can be
//! rewritten structurally before any typing happens.
//!
//! [`IntermediateSpec`]: super::IntermediateSpec

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::{Result, SpecError};
use crate::model::HttpMethod;

const SWAGGER_DEFINITIONS: &str = "#/definitions/";
const SWAGGER_PARAMETERS: &str = "#/parameters/";
const OPENAPI_SCHEMAS: &str = "#/components/schemas/";
const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// Map a Swagger `collectionFormat` onto an OpenAPI 3 parameter style
pub fn openapi_style(collection_format: &str) -> Option<&'static str> {
    match collection_format {
        "csv" => Some("simple"),
        "pipes" => Some("pipeDelimited"),
        "ssv" => Some("spaceDelimited"),
        _ => None,
    }
}

// =============================================================================
// Vendor Tag Swap
// =============================================================================

/// Replace vendor extension keys with their standard equivalents, in place.
///
/// `x-looker-nullable` becomes `nullable`; `x-looker-values` becomes `enum`
/// unless the node already declares one.
pub fn swap_vendor_tags(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if let Some(nullable) = map.remove("x-looker-nullable") {
                map.entry("nullable").or_insert(nullable);
            }
            if let Some(values) = map.remove("x-looker-values") {
                map.entry("enum").or_insert(values);
            }
            for child in map.values_mut() {
                swap_vendor_tags(child);
            }
        }
        Value::Array(items) => {
            for child in items {
                swap_vendor_tags(child);
            }
        }
        _ => {}
    }
}

// =============================================================================
// Swagger 2.0
// =============================================================================

/// Upgrade a Swagger 2.0 document to the OpenAPI 3 shape.
///
/// Returns the upgraded tree and a log of fixes applied along the way.
pub fn upgrade_swagger(doc: &Value) -> Result<(Value, Vec<String>)> {
    let root = doc
        .as_object()
        .ok_or_else(|| SpecError::format("Swagger document must be a JSON object"))?;
    let mut fixes = Vec::new();

    let global_params = root
        .get("parameters")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let global_produces = media_list(root.get("produces"));
    let global_consumes = media_list(root.get("consumes"));

    let mut paths = Map::new();
    if let Some(source_paths) = root.get("paths").and_then(Value::as_object) {
        for (endpoint, item) in source_paths {
            let item = item
                .as_object()
                .ok_or_else(|| SpecError::format(format!("path '{}' must be an object", endpoint)))?;
            let shared = inline_params(item.get("parameters"), &global_params)?;

            let mut upgraded = Map::new();
            for verb in HttpMethod::ALL {
                let Some(op) = item.get(verb.key()).and_then(Value::as_object) else {
                    continue;
                };
                let ctx = OperationContext {
                    endpoint,
                    verb,
                    produces: &global_produces,
                    consumes: &global_consumes,
                    global_params: &global_params,
                };
                let op = upgrade_operation(op, &shared, &ctx, &mut fixes)?;
                upgraded.insert(verb.key().to_string(), op);
            }
            paths.insert(endpoint.clone(), Value::Object(upgraded));
        }
    }

    let mut out = Map::new();
    out.insert("openapi".into(), json!("3.0.0"));
    if let Some(info) = root.get("info") {
        out.insert("info".into(), info.clone());
    }
    if let Some(tags) = root.get("tags") {
        out.insert("tags".into(), tags.clone());
    }
    out.insert("paths".into(), Value::Object(paths));
    let schemas = root.get("definitions").cloned().unwrap_or_else(|| json!({}));
    out.insert("components".into(), json!({ "schemas": schemas }));

    let mut upgraded = Value::Object(out);
    rewrite_refs(&mut upgraded);
    debug!(fixes = fixes.len(), "upgraded swagger 2.0 document");
    Ok((upgraded, fixes))
}

struct OperationContext<'a> {
    endpoint: &'a str,
    verb: HttpMethod,
    produces: &'a [String],
    consumes: &'a [String],
    global_params: &'a Map<String, Value>,
}

fn upgrade_operation(
    op: &Map<String, Value>,
    shared: &[Value],
    ctx: &OperationContext<'_>,
    fixes: &mut Vec<String>,
) -> Result<Value> {
    let operation_id = op
        .get("operationId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let label = format!("{}::{}", ctx.endpoint, operation_id);

    let mut out = Map::new();
    for (key, value) in op {
        match key.as_str() {
            "parameters" | "responses" | "produces" | "consumes" => {}
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }

    // operation-level parameters override path-level ones with the same name and location
    let own = inline_params(op.get("parameters"), ctx.global_params)?;
    let mut merged: Vec<Value> = shared
        .iter()
        .filter(|p| !own.iter().any(|o| same_param(o, p)))
        .cloned()
        .collect();
    merged.extend(own);

    let consumes = {
        let local = media_list(op.get("consumes"));
        if local.is_empty() {
            ctx.consumes.to_vec()
        } else {
            local
        }
    };

    let mut params = Vec::new();
    for param in merged {
        let location = param.get("in").and_then(Value::as_str).unwrap_or_default();
        match location {
            "body" => {
                let required = param.get("required").and_then(Value::as_bool).unwrap_or(true);
                let schema = param.get("schema").cloned().unwrap_or_else(|| json!({}));
                let mut content = Map::new();
                let media_types = if consumes.is_empty() {
                    vec![DEFAULT_MEDIA_TYPE.to_string()]
                } else {
                    consumes.clone()
                };
                for media in media_types {
                    content.insert(media, json!({ "schema": schema.clone() }));
                }
                let mut body = Map::new();
                if let Some(description) = param.get("description") {
                    body.insert("description".into(), description.clone());
                }
                body.insert("required".into(), json!(required));
                body.insert("content".into(), Value::Object(content));
                out.insert("requestBody".into(), Value::Object(body));
                fixes.push(format!("{} setting requestBody.required to {}", label, required));
            }
            "formData" => {
                fixes.push(format!(
                    "{} dropped formData parameter '{}'",
                    label,
                    param.get("name").and_then(Value::as_str).unwrap_or_default()
                ));
            }
            _ => params.push(upgrade_param(&param, &label, fixes)?),
        }
    }
    if !params.is_empty() {
        out.insert("parameters".into(), Value::Array(params));
    }

    let produces = {
        let local = media_list(op.get("produces"));
        if !local.is_empty() {
            local
        } else if !ctx.produces.is_empty() {
            ctx.produces.to_vec()
        } else {
            vec![DEFAULT_MEDIA_TYPE.to_string()]
        }
    };
    let mut responses = Map::new();
    if let Some(source) = op.get("responses").and_then(Value::as_object) {
        for (code, response) in source {
            responses.insert(code.clone(), upgrade_response(response, &produces));
        }
    }
    out.insert("responses".into(), Value::Object(responses));

    debug!(verb = %ctx.verb, endpoint = ctx.endpoint, "upgraded operation");
    Ok(Value::Object(out))
}

/// Move the type keywords of a non-body parameter under `schema`
fn upgrade_param(param: &Value, label: &str, fixes: &mut Vec<String>) -> Result<Value> {
    let source = param
        .as_object()
        .ok_or_else(|| SpecError::format(format!("{} parameter must be an object", label)))?;
    let mut out = Map::new();
    let mut schema = Map::new();
    for (key, value) in source {
        match key.as_str() {
            "type" | "format" | "items" | "enum" | "default" | "minimum" | "maximum" => {
                schema.insert(key.clone(), value.clone());
            }
            "collectionFormat" => {}
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    if let Some(format) = source.get("collectionFormat").and_then(Value::as_str) {
        let name = source.get("name").and_then(Value::as_str).unwrap_or_default();
        // "multi" is the repeated-key form, which is the OpenAPI 3 default for arrays
        if format != "multi" {
            let style = openapi_style(format).ok_or_else(|| {
                SpecError::format(format!(
                    "{} {}: collectionFormat '{}' is unknown",
                    label, name, format
                ))
            })?;
            out.insert("style".into(), json!(style));
            fixes.push(format!("{} {} '{}' -> '{}'", label, name, format, style));
        }
    }
    if !schema.is_empty() && !out.contains_key("schema") {
        out.insert("schema".into(), Value::Object(schema));
    }
    Ok(Value::Object(out))
}

fn upgrade_response(response: &Value, produces: &[String]) -> Value {
    let Some(source) = response.as_object() else {
        return response.clone();
    };
    if source.contains_key("$ref") {
        return response.clone();
    }
    let mut out = Map::new();
    for (key, value) in source {
        if key != "schema" && key != "headers" && key != "examples" {
            out.insert(key.clone(), value.clone());
        }
    }
    if let Some(schema) = source.get("schema") {
        let content: Map<String, Value> = produces
            .iter()
            .map(|media| (media.clone(), json!({ "schema": schema.clone() })))
            .collect();
        out.insert("content".into(), Value::Object(content));
    }
    Value::Object(out)
}

/// Resolve `#/parameters/X` references against the global parameter table
fn inline_params(params: Option<&Value>, globals: &Map<String, Value>) -> Result<Vec<Value>> {
    let Some(list) = params.and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    list.iter()
        .map(|param| match param.get("$ref").and_then(Value::as_str) {
            Some(reference) => reference
                .strip_prefix(SWAGGER_PARAMETERS)
                .and_then(|name| globals.get(name))
                .cloned()
                .ok_or_else(|| SpecError::unresolved(reference)),
            None => Ok(param.clone()),
        })
        .collect()
}

fn same_param(a: &Value, b: &Value) -> bool {
    a.get("name") == b.get("name") && a.get("in") == b.get("in")
}

fn media_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Point every `#/definitions/X` reference at `#/components/schemas/X`
fn rewrite_refs(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if key == "$ref" {
                    if let Value::String(reference) = child {
                        if let Some(name) = reference.strip_prefix(SWAGGER_DEFINITIONS) {
                            *reference = format!("{}{}", OPENAPI_SCHEMAS, name);
                        }
                    }
                } else {
                    rewrite_refs(child);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(rewrite_refs),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swagger() -> Value {
        json!({
            "swagger": "2.0",
            "info": { "title": "Demo", "version": "1.0" },
            "produces": ["application/json"],
            "paths": {
                "/users": {
                    "get": {
                        "operationId": "all_users",
                        "parameters": [
                            { "name": "ids", "in": "query", "type": "array",
                              "items": { "type": "integer", "format": "int64" },
                              "collectionFormat": "csv" }
                        ],
                        "responses": {
                            "200": { "description": "Users",
                                     "schema": { "type": "array", "items": { "$ref": "#/definitions/User" } } }
                        }
                    },
                    "post": {
                        "operationId": "create_user",
                        "parameters": [
                            { "name": "body", "in": "body", "required": false,
                              "schema": { "$ref": "#/definitions/User" } }
                        ],
                        "responses": { "200": { "description": "User", "schema": { "$ref": "#/definitions/User" } } }
                    }
                }
            },
            "definitions": {
                "User": { "type": "object", "properties": { "id": { "type": "integer" } } }
            }
        })
    }

    #[test]
    fn test_collection_format_styles() {
        assert_eq!(openapi_style("csv"), Some("simple"));
        assert_eq!(openapi_style("pipes"), Some("pipeDelimited"));
        assert_eq!(openapi_style("ssv"), Some("spaceDelimited"));
        assert_eq!(openapi_style("tsv"), None);
    }

    #[test]
    fn test_upgrade_moves_definitions_and_refs() {
        let (doc, fixes) = upgrade_swagger(&swagger()).unwrap();
        assert_eq!(doc["openapi"], "3.0.0");
        assert!(doc["components"]["schemas"]["User"].is_object());
        let items = &doc["paths"]["/users"]["get"]["responses"]["200"]["content"]["application/json"]["schema"]["items"];
        assert_eq!(items["$ref"], "#/components/schemas/User");
        assert!(fixes.iter().any(|f| f.contains("'csv' -> 'simple'")));
    }

    #[test]
    fn test_upgrade_body_to_request_body() {
        let (doc, fixes) = upgrade_swagger(&swagger()).unwrap();
        let body = &doc["paths"]["/users"]["post"]["requestBody"];
        assert_eq!(body["required"], false);
        assert_eq!(
            body["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/User"
        );
        assert!(doc["paths"]["/users"]["post"].get("parameters").is_none());
        assert!(fixes.iter().any(|f| f.contains("requestBody.required to false")));
    }

    #[test]
    fn test_upgrade_param_schema() {
        let (doc, _) = upgrade_swagger(&swagger()).unwrap();
        let param = &doc["paths"]["/users"]["get"]["parameters"][0];
        assert_eq!(param["style"], "simple");
        assert_eq!(param["schema"]["type"], "array");
        assert!(param.get("collectionFormat").is_none());
    }

    #[test]
    fn test_unknown_collection_format_fails() {
        let mut doc = swagger();
        doc["paths"]["/users"]["get"]["parameters"][0]["collectionFormat"] = json!("tsv");
        let err = upgrade_swagger(&doc).unwrap_err();
        assert!(matches!(err, SpecError::SpecFormat(msg) if msg.contains("tsv")));
    }

    #[test]
    fn test_vendor_tag_swap() {
        let mut doc = json!({
            "properties": {
                "a": { "type": "string", "x-looker-nullable": true },
                "b": { "type": "string", "x-looker-values": ["x", "y"] },
                "c": { "type": "string", "enum": ["z"], "x-looker-values": ["x"] }
            }
        });
        swap_vendor_tags(&mut doc);
        assert_eq!(doc["properties"]["a"]["nullable"], true);
        assert_eq!(doc["properties"]["b"]["enum"], json!(["x", "y"]));
        assert_eq!(doc["properties"]["c"]["enum"], json!(["z"]));
        assert!(doc["properties"]["a"].get("x-looker-nullable").is_none());
    }
}
