//! Spec comparison and search over two versions of the same API

use sdk_codegen::diff::{self, compare_specs, include_all, include_diffs, status_filter};
use sdk_codegen::search::{criteria_from_names, search, search_all};
use sdk_codegen::{ApiModel, SearchCriterion};

const API_V1: &str = include_str!("fixtures/api_v1.json");
const API_V2: &str = include_str!("fixtures/api_v2.json");

fn versions() -> (ApiModel, ApiModel) {
    (
        ApiModel::from_json(API_V1).unwrap(),
        ApiModel::from_json(API_V2).unwrap(),
    )
}

fn names(rows: &[diff::DiffRow]) -> Vec<&str> {
    rows.iter().map(|r| r.name.as_str()).collect()
}

// =============================================================================
// Diff
// =============================================================================

#[test]
fn test_self_diff_is_empty() {
    let (v1, _) = versions();
    assert!(compare_specs(&v1, &v1, include_all).is_empty());
}

#[test]
fn test_status_and_param_changes() {
    let (v1, v2) = versions();
    let rows = compare_specs(&v1, &v2, include_all);
    assert_eq!(names(&rows), ["run_look", "search_looks"]);

    let run_look = &rows[0];
    assert_eq!(run_look.l_status, "stable");
    assert_eq!(run_look.r_status, "beta");
    assert!(!run_look.has_changes());

    let search_looks = &rows[1];
    assert_eq!(
        search_looks.params_diff,
        r#"{"limit":{"lhs":"int64 query","rhs":"string query"}}"#
    );
    assert!(search_looks.type_diff.is_empty());
    assert!(search_looks.response_diff.is_empty());

    assert_eq!(names(&compare_specs(&v1, &v2, include_diffs)), names(&rows));
}

#[test]
fn test_left_status_filter() {
    let (v1, v2) = versions();
    let forward = compare_specs(&v1, &v2, status_filter("beta"));
    assert_eq!(names(&forward), ["search_looks"]);

    let backward = compare_specs(&v2, &v1, status_filter("beta"));
    assert_eq!(names(&backward), ["run_look", "search_looks"]);
    assert_eq!(backward[0].l_status, "beta");
    assert_eq!(backward[0].r_status, "stable");
}

#[test]
fn test_export_two_rows() {
    let (v1, v2) = versions();
    let rows = compare_specs(&v1, &v2, include_all);

    let csv = diff::to_csv(&rows).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], diff::CSV_HEADER.join(","));
    assert_eq!(lines[1], "run_look,GET /looks/{look_id}/run/{result_format},stable,beta,,,,");

    let markdown = diff::to_markdown(&rows);
    assert_eq!(markdown.lines().count(), 4);
    assert!(markdown.starts_with("| name | id | lStatus | rStatus |"));
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_method_name_search_skips_types() {
    let (v1, _) = versions();
    let criteria = [SearchCriterion::Method, SearchCriterion::Name].into_iter().collect();
    let result = search(&v1, "dash", &criteria);
    assert!(result.ok);
    assert_eq!(result.methods(), ["create_dashboard"]);
    assert_eq!(result.tags["Dashboard"], ["create_dashboard"]);
    // Look's description mentions dashboards, but types are not searched
    assert!(result.types.is_empty());
}

#[test]
fn test_type_description_search() {
    let (v1, _) = versions();
    let criteria = criteria_from_names(&["type", "description"]);
    let result = search(&v1, "shown on a dashboard", &criteria);
    assert_eq!(result.types, ["Look"]);
    assert!(result.tags.is_empty());
}

#[test]
fn test_status_and_activity_search() {
    let (v1, _) = versions();
    let result = search(&v1, "^beta$", &criteria_from_names(&["status"]));
    assert_eq!(result.methods(), ["search_looks"]);
    assert!(result.types.is_empty());

    let result = search(&v1, "db_query", &criteria_from_names(&["activityType"]));
    assert_eq!(result.methods(), ["run_look"]);
}

#[test]
fn test_search_all_terminates_on_recursive_types() {
    let (v1, _) = versions();
    let result = search(&v1, "parent", &search_all());
    assert!(result.ok);
    assert!(result.types.contains(&"Folder".to_string()));
    assert!(result.types.contains(&"Dashboard".to_string()));
}

#[test]
fn test_no_matches_offers_suggestions() {
    let (v1, _) = versions();
    let criteria = criteria_from_names(&["method", "name"]);
    let result = search(&v1, "dashbord", &criteria);
    assert!(result.ok);
    assert!(result.is_empty());
    assert_eq!(result.message, "No matches for 'dashbord'");
    assert!(result.suggestions.len() <= 5);
    assert!(result.suggestions.contains(&"create_dashboard".to_string()));
}

#[test]
fn test_malformed_pattern() {
    let (v1, _) = versions();
    let result = search(&v1, "look(", &search_all());
    assert!(!result.ok);
    assert!(result.message.starts_with("Error: invalid search expression"));
    assert!(result.is_empty());
}
