//! Model Search
//!
//! Case-insensitive regular expression search over the methods and types
//! of an [`ApiModel`], restricted to the fields named by a set of
//! criteria. A plain word is a substring match.
//!
//! Empty results are not an error: `ok` stays true and the message says
//! nothing matched, with fuzzy name suggestions attached.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::SpecError;
use crate::model::{ApiModel, Method, MethodContract, MethodResponse, Parameter, Property, Type, TypeOrigin};

/// Maximum number of suggestions offered when nothing matches
const MAX_SUGGESTIONS: usize = 5;

// =============================================================================
// Criteria
// =============================================================================

/// A field family the search may look at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchCriterion {
    Method,
    Type,
    Name,
    Description,
    Argument,
    Property,
    Title,
    ActivityType,
    Status,
    Response,
}

pub type SearchCriteria = BTreeSet<SearchCriterion>;

/// Every criterion
pub const SEARCH_ALL: [SearchCriterion; 10] = [
    SearchCriterion::Method,
    SearchCriterion::Type,
    SearchCriterion::Name,
    SearchCriterion::Description,
    SearchCriterion::Argument,
    SearchCriterion::Property,
    SearchCriterion::Title,
    SearchCriterion::ActivityType,
    SearchCriterion::Status,
    SearchCriterion::Response,
];

impl SearchCriterion {
    pub fn name(self) -> &'static str {
        match self {
            SearchCriterion::Method => "method",
            SearchCriterion::Type => "type",
            SearchCriterion::Name => "name",
            SearchCriterion::Description => "description",
            SearchCriterion::Argument => "argument",
            SearchCriterion::Property => "property",
            SearchCriterion::Title => "title",
            SearchCriterion::ActivityType => "activityType",
            SearchCriterion::Status => "status",
            SearchCriterion::Response => "response",
        }
    }
}

impl fmt::Display for SearchCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchCriterion {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SEARCH_ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SpecError::format(format!("unknown search criterion '{}'", s)))
    }
}

pub fn search_all() -> SearchCriteria {
    SEARCH_ALL.into_iter().collect()
}

/// Criteria from names; unknown names are ignored
pub fn criteria_from_names<S: AsRef<str>>(names: &[S]) -> SearchCriteria {
    names.iter().filter_map(|n| n.as_ref().parse().ok()).collect()
}

pub fn criteria_names(criteria: &SearchCriteria) -> Vec<String> {
    criteria.iter().map(|c| c.name().to_string()).collect()
}

// =============================================================================
// Search
// =============================================================================

/// Outcome of one search call
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResult {
    /// False only when the pattern is malformed
    pub ok: bool,
    /// Tag name -> matching method names
    pub tags: BTreeMap<String, Vec<String>>,
    /// Matching type names
    pub types: Vec<String>,
    pub message: String,
    /// Close names, offered when nothing matched
    pub suggestions: Vec<String>,
}

impl SearchResult {
    pub fn method_count(&self) -> usize {
        self.tags.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.types.is_empty()
    }

    /// All matching method names, sorted
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tags.values().flatten().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Search `api` for `pattern` in the fields selected by `criteria`
pub fn search(api: &ApiModel, pattern: &str, criteria: &SearchCriteria) -> SearchResult {
    let rx = match RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
    {
        Ok(rx) => rx,
        Err(e) => {
            return SearchResult {
                ok: false,
                message: format!("Error: invalid search expression: {}", e),
                ..SearchResult::default()
            }
        }
    };

    let mut matcher = Matcher::new(api, &rx, criteria);
    let mut result = SearchResult {
        ok: true,
        ..SearchResult::default()
    };

    if is_method_search(criteria) {
        for tag in api.tags().values() {
            let hits: Vec<String> = api
                .tag_methods(&tag.name)
                .into_iter()
                .filter(|m| matcher.method(m))
                .map(|m| m.name.clone())
                .collect();
            if !hits.is_empty() {
                result.tags.insert(tag.name.clone(), hits);
            }
        }
    }
    if is_type_search(criteria) {
        result.types = api
            .types()
            .values()
            .filter(|t| is_listed(t))
            .filter(|t| matcher.type_matches(&t.name))
            .map(|t| t.name.clone())
            .collect();
    }

    if result.is_empty() {
        result.message = format!("No matches for '{}'", pattern);
        result.suggestions = suggestions(api, pattern);
    } else {
        result.message = format!(
            "{} methods and {} types match '{}'",
            result.method_count(),
            result.types.len(),
            pattern
        );
    }
    debug!(pattern, methods = result.method_count(), types = result.types.len(), "search done");
    result
}

fn is_method_search(criteria: &SearchCriteria) -> bool {
    [
        SearchCriterion::Method,
        SearchCriterion::Name,
        SearchCriterion::Argument,
        SearchCriterion::Response,
        SearchCriterion::Status,
        SearchCriterion::ActivityType,
    ]
    .iter()
    .any(|c| criteria.contains(c))
}

fn is_type_search(criteria: &SearchCriteria) -> bool {
    [SearchCriterion::Type, SearchCriterion::Title, SearchCriterion::Status]
        .iter()
        .any(|c| criteria.contains(c))
}

/// Types reported in results; vocabulary and collection wrappers are not
fn is_listed(ty: &Type) -> bool {
    !matches!(ty.origin, TypeOrigin::Intrinsic | TypeOrigin::Collection)
}

/// Up to [`MAX_SUGGESTIONS`] method and type names closest to `pattern`
fn suggestions(api: &ApiModel, pattern: &str) -> Vec<String> {
    let fuzzy = SkimMatcherV2::default();
    let names = api
        .methods()
        .keys()
        .chain(api.types().values().filter(|t| is_listed(t)).map(|t| &t.name));
    let mut scored: Vec<(i64, &String)> = names
        .filter_map(|name| fuzzy.fuzzy_match(name, pattern).map(|score| (score, name)))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.dedup_by(|a, b| a.1 == b.1);
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, name)| name.clone())
        .collect()
}

// =============================================================================
// Matcher
// =============================================================================

/// Per-call matching state.
///
/// Type results are memoized by name; a type still being examined counts
/// as not matching, so recursive property types terminate.
struct Matcher<'a> {
    api: &'a ApiModel,
    rx: &'a Regex,
    criteria: &'a SearchCriteria,
    visited: HashMap<String, bool>,
}

impl<'a> Matcher<'a> {
    fn new(api: &'a ApiModel, rx: &'a Regex, criteria: &'a SearchCriteria) -> Self {
        Self {
            api,
            rx,
            criteria,
            visited: HashMap::new(),
        }
    }

    fn has(&self, criterion: SearchCriterion) -> bool {
        self.criteria.contains(&criterion)
    }

    fn any_match<'s>(&self, fields: impl IntoIterator<Item = &'s str>) -> bool {
        fields.into_iter().any(|f| !f.is_empty() && self.rx.is_match(f))
    }

    fn method(&mut self, method: &Method) -> bool {
        if self.method_text(method) {
            return true;
        }
        if let Some(primary) = method.primary_response() {
            if self.type_matches(&primary.type_name) {
                return true;
            }
        }
        if self.has(SearchCriterion::Argument) && method.params.iter().any(|p| self.parameter(p)) {
            return true;
        }
        self.has(SearchCriterion::Response) && method.responses.iter().any(|r| self.response(r))
    }

    /// A method's own text is examined only for these criteria; a
    /// `response` search looks at responses alone
    fn searches_method_text(&self) -> bool {
        [
            SearchCriterion::Method,
            SearchCriterion::Name,
            SearchCriterion::Argument,
            SearchCriterion::Status,
            SearchCriterion::ActivityType,
        ]
        .into_iter()
        .any(|c| self.has(c))
    }

    fn method_text(&self, method: &Method) -> bool {
        if !self.searches_method_text() {
            return false;
        }
        let mut fields = vec![method.summary.as_str(), method.endpoint.as_str()];
        if self.has(SearchCriterion::Name) || self.has(SearchCriterion::Method) {
            fields.push(&method.name);
        }
        if self.has(SearchCriterion::Method) && self.has(SearchCriterion::Description) {
            fields.push(&method.description);
        }
        if self.has(SearchCriterion::ActivityType) {
            fields.push(&method.activity_type);
            if method.rate_limited {
                fields.push("rate_limited");
            }
        }
        if self.has(SearchCriterion::Status) {
            fields.push(&method.status);
            if method.deprecated {
                fields.push("deprecated");
            }
        }
        self.any_match(fields)
    }

    fn parameter(&mut self, param: &Parameter) -> bool {
        let mut fields: Vec<&str> = Vec::new();
        if self.has(SearchCriterion::Name) {
            fields.push(&param.name);
        }
        if self.has(SearchCriterion::Description) {
            fields.push(&param.description);
        }
        self.any_match(fields) || self.type_matches(&param.type_name)
    }

    fn response(&mut self, response: &MethodResponse) -> bool {
        let code = response.status_code.to_string();
        let mode = format!("{:?}", response.mode());
        let mut fields = vec![code.as_str(), mode.as_str()];
        if self.has(SearchCriterion::Name) {
            fields.push(&response.media_type);
        }
        self.any_match(fields) || self.type_matches(&response.type_name)
    }

    fn property(&mut self, prop: &Property) -> bool {
        let mut fields: Vec<&str> = Vec::new();
        if self.has(SearchCriterion::Name) || self.has(SearchCriterion::Method) {
            fields.push(&prop.name);
            fields.push(&prop.json_name);
        }
        if self.has(SearchCriterion::Description) {
            fields.push(&prop.description);
        }
        if self.has(SearchCriterion::Status) {
            fields.push(&prop.status);
            if prop.deprecated {
                fields.push("deprecated");
            }
        }
        self.any_match(fields) || self.type_matches(&prop.type_name)
    }

    /// Whether the named type, or a type it reaches through its
    /// properties, matches
    fn type_matches(&mut self, name: &str) -> bool {
        if !is_type_search(self.criteria) {
            return false;
        }
        if let Some(&known) = self.visited.get(name) {
            return known;
        }
        let api = self.api;
        let Some(ty) = api.type_by_name(name) else {
            return false;
        };
        self.visited.insert(name.to_string(), false);
        // collections match through their element
        let found = match ty.element_type() {
            Some(element) if ty.origin == TypeOrigin::Collection => self.type_matches(element),
            _ => self.type_text(ty) || self.type_properties(ty),
        };
        self.visited.insert(name.to_string(), found);
        found
    }

    fn type_text(&self, ty: &Type) -> bool {
        let mut fields: Vec<&str> = Vec::new();
        if self.has(SearchCriterion::Name) {
            fields.push(&ty.name);
        }
        if self.has(SearchCriterion::Description) {
            fields.push(&ty.description);
        }
        if self.has(SearchCriterion::Title) {
            fields.push(&ty.title);
        }
        if self.has(SearchCriterion::Status) {
            fields.push(&ty.status);
            if ty.deprecated {
                fields.push("deprecated");
            }
        }
        self.any_match(fields)
    }

    fn type_properties(&mut self, ty: &Type) -> bool {
        if !self.has(SearchCriterion::Property) && !self.has(SearchCriterion::Status) {
            return false;
        }
        ty.properties().any(|p| self.property(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> ApiModel {
        ApiModel::from_json(
            r##"{
                "openapi": "3.0.0",
                "info": { "title": "Demo", "version": "4.0" },
                "tags": [ { "name": "Dashboard" }, { "name": "Look" } ],
                "paths": {
                    "/dashboards": { "post": {
                        "operationId": "create_dashboard",
                        "tags": ["Dashboard"],
                        "summary": "Create Dashboard",
                        "responses": { "200": { "description": "Dashboard",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Dashboard" } } } } }
                    } },
                    "/looks": { "get": {
                        "operationId": "all_looks",
                        "tags": ["Look"],
                        "summary": "Get All Looks",
                        "x-looker-status": "beta",
                        "parameters": [ { "name": "fields", "in": "query", "schema": { "type": "string" } } ],
                        "responses": { "200": { "description": "Looks",
                            "content": { "application/json": { "schema": {
                                "type": "array", "items": { "$ref": "#/components/schemas/Look" } } } } } }
                    } }
                },
                "components": { "schemas": {
                    "Dashboard": { "type": "object", "properties": {
                        "title": { "type": "string" },
                        "parent": { "$ref": "#/components/schemas/Dashboard" }
                    } },
                    "Look": { "type": "object", "description": "A look can be added to a dashboard",
                        "properties": { "dashboards": { "type": "array", "items": { "$ref": "#/components/schemas/Dashboard" } } } }
                } }
            }"##,
        )
        .unwrap()
    }

    #[test]
    fn test_criteria_names_round_trip() {
        let criteria = criteria_from_names(&["method", "activityType", "bogus"]);
        assert_eq!(criteria.len(), 2);
        assert_eq!(criteria_names(&criteria), vec!["method", "activityType"]);
        assert_eq!(search_all().len(), SEARCH_ALL.len());
        assert_eq!("ActivityType".parse::<SearchCriterion>().unwrap(), SearchCriterion::ActivityType);
    }

    #[test]
    fn test_method_name_search_excludes_types() {
        let api = api();
        let criteria = criteria_from_names(&["method", "name"]);
        let result = search(&api, "dash", &criteria);
        assert!(result.ok);
        assert_eq!(result.methods(), vec!["create_dashboard"]);
        assert!(result.types.is_empty());
    }

    #[test]
    fn test_type_search_over_description() {
        let api = api();
        let criteria = criteria_from_names(&["type", "description"]);
        let result = search(&api, "DASHBOARD", &criteria);
        assert_eq!(result.types, vec!["Look"]);
        assert!(result.tags.is_empty());
    }

    #[test]
    fn test_recursive_types_terminate() {
        let api = api();
        let criteria = criteria_from_names(&["type", "property", "name"]);
        let result = search(&api, "parent", &criteria);
        // Look reaches Dashboard.parent through its dashboards property
        assert_eq!(result.types, vec!["Dashboard", "Look"]);
    }

    #[test]
    fn test_status_search() {
        let api = api();
        let criteria = criteria_from_names(&["status"]);
        let result = search(&api, "^beta$", &criteria);
        assert_eq!(result.tags.get("Look"), Some(&vec!["all_looks".to_string()]));
    }

    #[test]
    fn test_no_matches_is_ok_with_suggestions() {
        let api = api();
        let result = search(&api, "crdash", &search_all());
        assert!(result.ok);
        assert!(result.is_empty());
        assert!(result.message.starts_with("No matches"));
        assert_eq!(result.suggestions.first().map(String::as_str), Some("create_dashboard"));
    }

    #[test]
    fn test_response_search_ignores_method_text() {
        let api = api();
        let result = search(&api, "dashboards", &criteria_from_names(&["response"]));
        assert!(result.ok);
        assert!(result.tags.is_empty());

        let result = search(&api, "^200$", &criteria_from_names(&["response"]));
        assert_eq!(result.methods(), vec!["all_looks", "create_dashboard"]);
    }

    #[test]
    fn test_name_alone_searches_methods() {
        let api = api();
        let result = search(&api, "create_dash", &criteria_from_names(&["name"]));
        assert_eq!(result.methods(), vec!["create_dashboard"]);
        assert!(result.types.is_empty());
    }

    #[test]
    fn test_malformed_pattern() {
        let api = api();
        let result = search(&api, "(unclosed", &search_all());
        assert!(!result.ok);
        assert!(result.message.starts_with("Error"));
    }
}
