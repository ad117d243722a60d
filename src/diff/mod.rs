//! Spec Diff
//!
//! Compares the methods of two API models. Methods are matched by id
//! (`VERB endpoint`); a row is produced for every method present on only
//! one side and for every matched pair that differs in status, primary
//! type, parameters, request body or responses.
//!
//! Each difference column holds a compact JSON object keyed by the item
//! that changed:
//!
//! ```text
//! {"limit":{"lhs":"int64 query","rhs":"string query"}}
//! ```
//!
//! A missing item is an empty string on its side.

mod export;

pub use export::{to_csv, to_markdown, CSV_HEADER};

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::info;

use crate::model::{ApiModel, Method, MethodContract, ParamLocation, Parameter, Type};

// =============================================================================
// Rows
// =============================================================================

/// One reported difference between two versions of a method
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffRow {
    pub name: String,
    /// `VERB endpoint`
    pub id: String,
    pub l_status: String,
    pub r_status: String,
    pub type_diff: String,
    pub params_diff: String,
    pub body_diff: String,
    pub response_diff: String,
}

impl DiffRow {
    /// Whether any comparison column is non-empty
    pub fn has_changes(&self) -> bool {
        !(self.type_diff.is_empty()
            && self.params_diff.is_empty()
            && self.body_diff.is_empty()
            && self.response_diff.is_empty())
    }
}

/// Left and right rendering of one changed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub lhs: String,
    pub rhs: String,
}

/// Changed items keyed by name, in key order
pub type Delta = BTreeMap<String, Change>;

fn record(delta: &mut Delta, key: impl Into<String>, lhs: String, rhs: String) {
    if lhs != rhs {
        delta.insert(key.into(), Change { lhs, rhs });
    }
}

/// Compact JSON for a delta, empty when nothing changed
fn render(delta: &Delta) -> String {
    if delta.is_empty() {
        return String::new();
    }
    serde_json::to_string(delta).unwrap_or_default()
}

// =============================================================================
// Filters
// =============================================================================

/// Keep every produced row
pub fn include_all(_row: &DiffRow, _left: Option<&Method>, _right: Option<&Method>) -> bool {
    true
}

/// Keep methods missing from either side and matched pairs with at least
/// one difference
pub fn include_diffs(row: &DiffRow, left: Option<&Method>, right: Option<&Method>) -> bool {
    left.is_none() || right.is_none() || row.l_status != row.r_status || row.has_changes()
}

/// Keep rows whose left-side status is `status`
pub fn status_filter(status: &str) -> impl Fn(&DiffRow, Option<&Method>, Option<&Method>) -> bool + '_ {
    move |row: &DiffRow, _: Option<&Method>, _: Option<&Method>| row.l_status == status
}

// =============================================================================
// Compare
// =============================================================================

/// Rows for every one-sided method and every differing pair accepted by
/// `include`, ordered by name then id
pub fn compare_specs<F>(left: &ApiModel, right: &ApiModel, include: F) -> Vec<DiffRow>
where
    F: Fn(&DiffRow, Option<&Method>, Option<&Method>) -> bool,
{
    let lhs = methods_by_id(left);
    let rhs = methods_by_id(right);
    let ids: BTreeSet<&String> = lhs.keys().chain(rhs.keys()).collect();

    let mut rows = Vec::new();
    for id in ids {
        let l_method = lhs.get(id).copied();
        let r_method = rhs.get(id).copied();
        let row = match (l_method, r_method) {
            (Some(l), Some(r)) => {
                let row = compare_methods(left, l, right, r);
                if row.l_status == row.r_status && !row.has_changes() {
                    continue;
                }
                row
            }
            (Some(l), None) => one_sided(l, true),
            (None, Some(r)) => one_sided(r, false),
            (None, None) => continue,
        };
        if include(&row, l_method, r_method) {
            rows.push(row);
        }
    }
    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    info!(
        left = %left.version(),
        right = %right.version(),
        rows = rows.len(),
        "compared specs"
    );
    rows
}

fn methods_by_id(api: &ApiModel) -> BTreeMap<String, &Method> {
    api.methods().values().map(|m| (m.id(), m)).collect()
}

fn one_sided(method: &Method, is_left: bool) -> DiffRow {
    let (l_status, r_status) = if is_left {
        (method.status.clone(), String::new())
    } else {
        (String::new(), method.status.clone())
    };
    DiffRow {
        name: method.name.clone(),
        id: method.id(),
        l_status,
        r_status,
        ..DiffRow::default()
    }
}

/// Full comparison of a matched pair
pub fn compare_methods(left: &ApiModel, l: &Method, right: &ApiModel, r: &Method) -> DiffRow {
    let mut type_delta = Delta::new();
    record(&mut type_delta, "type", l.return_type().to_string(), r.return_type().to_string());
    TypeComparer::new(left, right).compare(&mut type_delta, "type", l.return_type(), r.return_type());

    let mut body_delta = Delta::new();
    match (l.body_param(), r.body_param()) {
        (Some(lb), Some(rb)) => {
            record(&mut body_delta, "body", lb.summary(), rb.summary());
            TypeComparer::new(left, right).compare(&mut body_delta, "body", &lb.type_name, &rb.type_name);
        }
        (lb, rb) => record(
            &mut body_delta,
            "body",
            lb.map(Parameter::summary).unwrap_or_default(),
            rb.map(Parameter::summary).unwrap_or_default(),
        ),
    }

    DiffRow {
        name: l.name.clone(),
        id: l.id(),
        l_status: l.status.clone(),
        r_status: r.status.clone(),
        type_diff: render(&type_delta),
        params_diff: render(&compare_params(l, r)),
        body_diff: render(&body_delta),
        response_diff: render(&compare_responses(l, r)),
    }
}

/// Non-body parameters by name and location; a rename is a removal plus an
/// addition. A name used at more than one location is keyed `name@location`.
fn compare_params(l: &Method, r: &Method) -> Delta {
    let summaries = |m: &Method| -> BTreeMap<(String, ParamLocation), String> {
        m.params
            .iter()
            .filter(|p| !p.is_body())
            .map(|p| ((p.name.clone(), p.location), p.summary()))
            .collect()
    };
    let lhs = summaries(l);
    let rhs = summaries(r);
    let keys: BTreeSet<&(String, ParamLocation)> = lhs.keys().chain(rhs.keys()).collect();

    let mut locations: BTreeMap<&str, usize> = BTreeMap::new();
    for &key in &keys {
        *locations.entry(key.0.as_str()).or_default() += 1;
    }

    let mut delta = Delta::new();
    for key in keys {
        let (name, location) = key;
        let label = if locations[name.as_str()] > 1 {
            format!("{}@{}", name, location)
        } else {
            name.clone()
        };
        record(
            &mut delta,
            label,
            lhs.get(key).cloned().unwrap_or_default(),
            rhs.get(key).cloned().unwrap_or_default(),
        );
    }
    delta
}

/// Responses grouped by status code
fn compare_responses(l: &Method, r: &Method) -> Delta {
    let by_code = |m: &Method| -> BTreeMap<u16, String> {
        let mut grouped: BTreeMap<u16, Vec<String>> = BTreeMap::new();
        for response in &m.responses {
            grouped
                .entry(response.status_code)
                .or_default()
                .push(response.summary());
        }
        grouped
            .into_iter()
            .map(|(code, mut list)| {
                list.sort();
                (code, list.join(", "))
            })
            .collect()
    };
    let lhs = by_code(l);
    let rhs = by_code(r);
    let mut delta = Delta::new();
    for code in lhs.keys().chain(rhs.keys()) {
        record(
            &mut delta,
            code.to_string(),
            lhs.get(code).cloned().unwrap_or_default(),
            rhs.get(code).cloned().unwrap_or_default(),
        );
    }
    delta
}

// =============================================================================
// Structural Type Comparison
// =============================================================================

/// Walks two type graphs in step. Each (left, right) pair of complex
/// types is expanded once, so cyclic graphs terminate.
struct TypeComparer<'a> {
    left: &'a ApiModel,
    right: &'a ApiModel,
    seen: HashSet<(String, String)>,
}

impl<'a> TypeComparer<'a> {
    fn new(left: &'a ApiModel, right: &'a ApiModel) -> Self {
        Self {
            left,
            right,
            seen: HashSet::new(),
        }
    }

    /// Compare the properties of the complex types underneath two named
    /// types, recording changes under `key.`
    fn compare(&mut self, delta: &mut Delta, key: &str, l_name: &str, r_name: &str) {
        let (Some(lt), Some(rt)) = (self.left.type_by_name(l_name), self.right.type_by_name(r_name)) else {
            return;
        };
        let lb = self.left.base_type(lt);
        let rb = self.right.base_type(rt);
        if lb.is_complex() && rb.is_complex() {
            self.compare_properties(delta, key, lb, rb);
        }
    }

    fn compare_properties(&mut self, delta: &mut Delta, key: &str, lt: &Type, rt: &Type) {
        if !self.seen.insert((lt.name.clone(), rt.name.clone())) {
            return;
        }
        let names: Vec<&String> = {
            let mut names: Vec<&String> = lt.properties().map(|p| &p.name).collect();
            names.extend(rt.properties().map(|p| &p.name).filter(|n| lt.property(n).is_none()));
            names
        };
        for name in names {
            let path = format!("{}.{}", key, name);
            match (lt.property(name), rt.property(name)) {
                (Some(lp), Some(rp)) => {
                    let (ls, rs) = (lp.summary(), rp.summary());
                    if ls != rs {
                        record(delta, path, ls, rs);
                        continue;
                    }
                    let (Some(lpt), Some(rpt)) =
                        (self.left.type_by_name(&lp.type_name), self.right.type_by_name(&rp.type_name))
                    else {
                        continue;
                    };
                    let lb = self.left.base_type(lpt);
                    let rb = self.right.base_type(rpt);
                    if lb.is_complex() && rb.is_complex() {
                        self.compare_properties(delta, &path, lb, rb);
                    }
                }
                (lp, rp) => record(
                    delta,
                    path,
                    lp.map(|p| p.summary()).unwrap_or_default(),
                    rp.map(|p| p.summary()).unwrap_or_default(),
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(run_look_status: &str, limit_type: &str, extra: serde_json::Value) -> ApiModel {
        let mut doc = json!({
            "openapi": "3.0.0",
            "info": { "title": "Demo", "version": run_look_status },
            "paths": {
                "/looks/{look_id}/run/{result_format}": { "get": {
                    "operationId": "run_look",
                    "x-looker-status": run_look_status,
                    "parameters": [
                        { "name": "look_id", "in": "path", "required": true, "schema": { "type": "string" } },
                        { "name": "result_format", "in": "path", "required": true, "schema": { "type": "string" } },
                        { "name": "limit", "in": "query", "schema": { "type": limit_type } }
                    ],
                    "responses": { "200": { "description": "Result",
                        "content": { "text": { "schema": { "type": "string" } } } } }
                } },
                "/folders": { "post": {
                    "operationId": "create_folder",
                    "x-looker-status": "stable",
                    "requestBody": { "content": { "application/json": {
                        "schema": { "$ref": "#/components/schemas/Folder" } } } },
                    "responses": { "200": { "description": "Folder",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Folder" } } } } }
                } }
            },
            "components": { "schemas": {
                "Folder": { "type": "object", "properties": {
                    "name": { "type": "string" },
                    "parent": { "$ref": "#/components/schemas/Folder" }
                } }
            } }
        });
        if let serde_json::Value::Object(extra) = extra {
            let paths = doc["paths"].as_object_mut().unwrap();
            paths.extend(extra);
        }
        ApiModel::from_json(&doc.to_string()).unwrap()
    }

    #[test]
    fn test_self_diff_is_empty() {
        let api = spec("stable", "integer", json!({}));
        assert!(compare_specs(&api, &api, include_all).is_empty());
    }

    #[test]
    fn test_status_change_and_filter() {
        let a = spec("stable", "integer", json!({}));
        let b = spec("beta", "integer", json!({}));

        let rows = compare_specs(&a, &b, include_all);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "run_look");
        assert_eq!(rows[0].id, "GET /looks/{look_id}/run/{result_format}");
        assert_eq!((rows[0].l_status.as_str(), rows[0].r_status.as_str()), ("stable", "beta"));

        assert!(compare_specs(&a, &b, status_filter("beta")).is_empty());
        assert_eq!(compare_specs(&b, &a, status_filter("beta")).len(), 1);
    }

    #[test]
    fn test_param_type_change() {
        let a = spec("stable", "integer", json!({}));
        let b = spec("stable", "string", json!({}));
        let rows = compare_specs(&a, &b, include_diffs);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].params_diff,
            r#"{"limit":{"lhs":"integer query","rhs":"string query"}}"#
        );
        assert!(rows[0].type_diff.is_empty());
        assert!(rows[0].body_diff.is_empty());
    }

    #[test]
    fn test_same_name_at_two_locations() {
        let extra = |id_type: &str| {
            json!({ "/items/{id}": { "get": {
                "operationId": "item",
                "parameters": [
                    { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } },
                    { "name": "id", "in": "query", "schema": { "type": id_type } }
                ],
                "responses": { "204": { "description": "none" } }
            } } })
        };
        let a = spec("stable", "integer", extra("string"));
        let b = spec("stable", "integer", extra("integer"));

        let rows = compare_specs(&a, &b, include_diffs);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].params_diff,
            r#"{"id@query":{"lhs":"string query","rhs":"integer query"}}"#
        );
    }

    #[test]
    fn test_one_sided_methods_are_symmetric() {
        let extra = json!({ "/ping": { "get": {
            "operationId": "ping",
            "x-looker-status": "stable",
            "responses": { "204": { "description": "Pong" } }
        } } });
        let a = spec("stable", "integer", extra);
        let b = spec("stable", "integer", json!({}));

        let ab = compare_specs(&a, &b, include_all);
        let ba = compare_specs(&b, &a, include_all);
        assert_eq!(ab.len(), 1);
        assert_eq!(ab[0].id, ba[0].id);
        assert_eq!((ab[0].l_status.as_str(), ab[0].r_status.as_str()), ("stable", ""));
        assert_eq!((ba[0].l_status.as_str(), ba[0].r_status.as_str()), ("", "stable"));

        let kept = compare_specs(&a, &b, include_diffs);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "ping");
        assert!(!kept[0].has_changes());
    }

    #[test]
    fn test_recursive_body_diff_terminates() {
        let a = spec("stable", "integer", json!({}));
        let b = ApiModel::from_json(
            &serde_json::to_string(&json!({
                "openapi": "3.0.0",
                "info": { "title": "Demo", "version": "2" },
                "paths": { "/folders": { "post": {
                    "operationId": "create_folder",
                    "x-looker-status": "stable",
                    "requestBody": { "content": { "application/json": {
                        "schema": { "$ref": "#/components/schemas/Folder" } } } },
                    "responses": { "200": { "description": "Folder",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Folder" } } } } }
                } } },
                "components": { "schemas": {
                    "Folder": { "type": "object", "required": ["name"], "properties": {
                        "name": { "type": "string" },
                        "parent": { "$ref": "#/components/schemas/Folder" }
                    } }
                } }
            }))
            .unwrap(),
        )
        .unwrap();

        let rows = compare_specs(&a, &b, include_diffs);
        let folder = rows.iter().find(|r| r.name == "create_folder").unwrap();
        assert_eq!(
            folder.body_diff,
            r#"{"body.name":{"lhs":"string","rhs":"string required"}}"#
        );
        assert_eq!(
            folder.type_diff,
            r#"{"type.name":{"lhs":"string","rhs":"string required"}}"#
        );
    }
}
