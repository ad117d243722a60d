//! Endpoint operations: methods, parameters and responses

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::SpecError;

// =============================================================================
// HTTP Verbs
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Verbs in the order they are read from a path item
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Lowercase key used for the verb inside a path item
    pub fn key(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SpecError::format(format!("unknown HTTP method '{}'", s)))
    }
}

// =============================================================================
// Parameters
// =============================================================================

/// Where a parameter travels in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
    Body,
}

impl ParamLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
            ParamLocation::Body => "body",
        }
    }
}

impl FromStr for ParamLocation {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(ParamLocation::Path),
            "query" => Ok(ParamLocation::Query),
            "header" => Ok(ParamLocation::Header),
            "cookie" => Ok(ParamLocation::Cookie),
            "body" => Ok(ParamLocation::Body),
            other => Err(SpecError::format(format!("unknown parameter location '{}'", other))),
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed input of a method
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub json_name: String,
    /// Name of the owning method
    pub owner: String,
    pub location: ParamLocation,
    pub type_name: String,
    pub required: bool,
    pub description: String,
    pub default: Option<String>,
    pub style: Option<String>,
    pub deprecated: bool,
}

impl Parameter {
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.owner, self.name)
    }

    pub fn is_body(&self) -> bool {
        self.location == ParamLocation::Body
    }

    /// Compact summary used by the differ
    pub fn summary(&self) -> String {
        let mut out = format!("{} {}", self.type_name, self.location);
        if self.required {
            out.push_str(" required");
        }
        out
    }
}

// =============================================================================
// Responses
// =============================================================================

/// How a response payload should be consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    String,
    Binary,
    Unknown,
}

impl ResponseMode {
    /// Classify a media type
    pub fn from_media_type(media_type: &str) -> Self {
        let media = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if media.is_empty() {
            return ResponseMode::Unknown;
        }
        let textual = media.starts_with("text/")
            || media.ends_with("json")
            || media.ends_with("+json")
            || media.ends_with("xml")
            || media.ends_with("+xml")
            || media == "application/x-www-form-urlencoded"
            || media == "application/sql"
            || media == "application/javascript"
            || media == "application/yaml"
            || media == "application/x-yaml";
        if textual {
            return ResponseMode::String;
        }
        if media.starts_with("image/")
            || media.starts_with("audio/")
            || media.starts_with("video/")
            || media.starts_with("font/")
            || media == "application/octet-stream"
            || media == "application/pdf"
            || media == "application/zip"
            || media == "application/msword"
            || media.starts_with("application/vnd.")
        {
            return ResponseMode::Binary;
        }
        ResponseMode::Unknown
    }
}

/// One declared response of a method
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodResponse {
    pub status_code: u16,
    pub media_type: String,
    pub type_name: String,
    pub description: String,
    /// Explicitly marked with `x-primary-response`
    pub primary: bool,
}

impl MethodResponse {
    pub fn mode(&self) -> ResponseMode {
        ResponseMode::from_media_type(&self.media_type)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn is_json(&self) -> bool {
        let media = self.media_type.to_ascii_lowercase();
        media.starts_with("application/json") || media.contains("+json")
    }

    pub fn summary(&self) -> String {
        if self.media_type.is_empty() {
            self.type_name.clone()
        } else {
            format!("{}:{}", self.media_type, self.type_name)
        }
    }
}

// =============================================================================
// Method
// =============================================================================

/// One API operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    /// Operation id
    pub name: String,
    pub http_method: HttpMethod,
    pub endpoint: String,
    pub status: String,
    pub summary: String,
    pub description: String,
    pub deprecated: bool,
    pub activity_type: String,
    pub rate_limited: bool,
    /// Primary tag
    pub tag: String,
    /// Declaration order: path parameters, operation parameters, then body
    pub params: Vec<Parameter>,
    pub responses: Vec<MethodResponse>,
    pub(crate) primary_index: Option<usize>,
    /// Every type named by a parameter or response
    pub types: BTreeSet<String>,
    /// Non-intrinsic named types reachable through `types`
    pub custom_types: BTreeSet<String>,
}

impl Method {
    /// `VERB endpoint`, the identity used when comparing specs
    pub fn id(&self) -> String {
        format!("{} {}", self.http_method, self.endpoint)
    }

    pub fn body_param(&self) -> Option<&Parameter> {
        self.params.iter().find(|p| p.is_body())
    }

    pub fn required_params(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|p| p.required)
    }

    pub fn optional_params(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|p| !p.required)
    }

    /// Responses with status 400 and up, one per distinct type
    pub fn error_responses(&self) -> Vec<&MethodResponse> {
        let mut seen = BTreeSet::new();
        self.responses
            .iter()
            .filter(|r| r.status_code >= 400)
            .filter(|r| seen.insert(r.type_name.as_str()))
            .collect()
    }

    pub fn ok_responses(&self) -> impl Iterator<Item = &MethodResponse> {
        self.responses.iter().filter(|r| r.is_success())
    }

    /// Choose the primary response: an explicit marker wins, then the lowest
    /// 2xx code preferring JSON media, then declaration order.
    pub(crate) fn select_primary(responses: &[MethodResponse]) -> Option<usize> {
        if let Some(index) = responses.iter().position(|r| r.primary) {
            return Some(index);
        }
        let lowest = responses
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.status_code)
            .min()?;
        let candidates = || {
            responses
                .iter()
                .enumerate()
                .filter(move |(_, r)| r.status_code == lowest)
        };
        candidates()
            .find(|(_, r)| r.is_json())
            .or_else(|| candidates().next())
            .map(|(index, _)| index)
    }
}

// =============================================================================
// Method Contract
// =============================================================================

/// Read-only view of a method consumed by generators.
///
/// Implemented by [`Method`] and by wrappers that alter a presentation
/// detail while delegating everything else.
pub trait MethodContract {
    fn name(&self) -> &str;
    fn http_method(&self) -> HttpMethod;
    fn endpoint(&self) -> &str;
    fn status(&self) -> &str;
    fn summary(&self) -> &str;
    fn description(&self) -> &str;
    fn deprecated(&self) -> bool;
    fn params(&self) -> &[Parameter];
    fn responses(&self) -> &[MethodResponse];
    fn primary_response(&self) -> Option<&MethodResponse>;

    /// Required parameters first, each group in declaration order
    fn all_params(&self) -> Vec<&Parameter> {
        let (mut required, optional): (Vec<&Parameter>, Vec<&Parameter>) =
            self.params().iter().partition(|p| p.required);
        required.extend(optional);
        required
    }

    fn id(&self) -> String {
        format!("{} {}", self.http_method(), self.endpoint())
    }

    /// Type name of the primary response, `void` when there is none
    fn return_type(&self) -> &str {
        self.primary_response()
            .map(|r| r.type_name.as_str())
            .unwrap_or("void")
    }
}

impl MethodContract for Method {
    fn name(&self) -> &str {
        &self.name
    }

    fn http_method(&self) -> HttpMethod {
        self.http_method
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn summary(&self) -> &str {
        &self.summary
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn deprecated(&self) -> bool {
        self.deprecated
    }

    fn params(&self) -> &[Parameter] {
        &self.params
    }

    fn responses(&self) -> &[MethodResponse] {
        &self.responses
    }

    fn primary_response(&self) -> Option<&MethodResponse> {
        self.primary_index.and_then(|i| self.responses.get(i))
    }
}

/// Presents a method with an empty description
pub struct WithoutDescription<'a, M: MethodContract + ?Sized>(pub &'a M);

impl<'a, M: MethodContract + ?Sized> MethodContract for WithoutDescription<'a, M> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn http_method(&self) -> HttpMethod {
        self.0.http_method()
    }

    fn endpoint(&self) -> &str {
        self.0.endpoint()
    }

    fn status(&self) -> &str {
        self.0.status()
    }

    fn summary(&self) -> &str {
        self.0.summary()
    }

    fn description(&self) -> &str {
        ""
    }

    fn deprecated(&self) -> bool {
        self.0.deprecated()
    }

    fn params(&self) -> &[Parameter] {
        self.0.params()
    }

    fn responses(&self) -> &[MethodResponse] {
        self.0.responses()
    }

    fn primary_response(&self) -> Option<&MethodResponse> {
        self.0.primary_response()
    }

    fn all_params(&self) -> Vec<&Parameter> {
        self.0.all_params()
    }
}

// =============================================================================
// Tags
// =============================================================================

/// A named group of methods
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tag {
    pub name: String,
    pub description: String,
    /// Method names in declaration order
    pub methods: Vec<String>,
}
