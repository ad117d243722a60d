//! Specification loading
//!
//! Accepts OpenAPI 3.x documents as-is and upgrades Swagger 2.0 documents
//! to the same canonical [`IntermediateSpec`]. Loading is all-or-nothing:
//! any structural problem yields [`SpecError::SpecFormat`].

mod openapi;
mod upgrade;

pub use openapi::{
    AdditionalProperties, Components, Info, IntermediateSpec, MediaType, Operation,
    ParameterObject, PathItem, RefOr, RequestBody, Response, Schema, TagObject,
};
pub use upgrade::{openapi_style, swap_vendor_tags, upgrade_swagger};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, SpecError};

// =============================================================================
// Spec Items
// =============================================================================

/// Content of a specification entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecSource {
    /// Raw JSON text
    Text(String),
    /// An already parsed document
    Json(Value),
    /// A remote location; never fetched
    Url(String),
}

/// A named specification with a lifecycle status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecItem {
    pub key: String,
    pub status: String,
    pub content: SpecSource,
}

impl SpecItem {
    pub fn new(key: impl Into<String>, status: impl Into<String>, content: SpecSource) -> Self {
        Self {
            key: key.into(),
            status: status.into(),
            content,
        }
    }

    /// Read a local JSON file as an inline item
    pub fn from_file(key: impl Into<String>, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(key, "current", SpecSource::Text(text)))
    }

    pub fn load(&self) -> Result<IntermediateSpec> {
        debug!(key = %self.key, status = %self.status, "loading spec item");
        match &self.content {
            SpecSource::Text(text) => load_str(text),
            SpecSource::Json(value) => load_value(value.clone()),
            SpecSource::Url(url) => Err(SpecError::format(format!(
                "spec '{}' only names a URL ({}); supply its content",
                self.key, url
            ))),
        }
    }
}

// =============================================================================
// Shape Detection
// =============================================================================

/// Recognized document shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecShape {
    OpenApi3,
    Swagger2,
}

/// Identify the document shape from its version marker
pub fn detect_shape(doc: &Value) -> Result<SpecShape> {
    let root = doc
        .as_object()
        .ok_or_else(|| SpecError::format("specification must be a JSON object"))?;
    if let Some(version) = root.get("openapi") {
        let version = version.as_str().unwrap_or_default();
        if version.starts_with("3.") {
            return Ok(SpecShape::OpenApi3);
        }
        return Err(SpecError::format(format!(
            "unsupported OpenAPI version '{}'",
            version
        )));
    }
    if let Some(version) = root.get("swagger") {
        if version.as_str() == Some("2.0") {
            return Ok(SpecShape::Swagger2);
        }
        return Err(SpecError::format(format!(
            "unsupported Swagger version '{}'",
            version
        )));
    }
    Err(SpecError::format("missing 'openapi' or 'swagger' version marker"))
}

// =============================================================================
// Loading
// =============================================================================

/// Parse JSON text and load it
pub fn load_str(text: &str) -> Result<IntermediateSpec> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| SpecError::format(format!("specification is not valid JSON: {}", e)))?;
    load_value(value)
}

/// Load an already parsed document
pub fn load_value(mut doc: Value) -> Result<IntermediateSpec> {
    let shape = detect_shape(&doc)?;
    swap_vendor_tags(&mut doc);

    let (canonical, fixes) = match shape {
        SpecShape::OpenApi3 => (doc, Vec::new()),
        SpecShape::Swagger2 => upgrade_swagger(&doc)?,
    };

    let mut spec: IntermediateSpec = serde_json::from_value(canonical)
        .map_err(|e| SpecError::format(format!("specification does not match OpenAPI 3: {}", e)))?;
    spec.fixes = fixes;

    info!(
        title = %spec.info.title,
        version = %spec.info.version,
        paths = spec.paths.len(),
        schemas = spec.components.schemas.len(),
        fixes = spec.fixes.len(),
        "loaded specification"
    );
    Ok(spec)
}

/// Load a local JSON file
pub fn load_file(path: &Path) -> Result<IntermediateSpec> {
    let text = std::fs::read_to_string(path)?;
    load_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_shapes() {
        assert_eq!(detect_shape(&json!({"openapi": "3.0.1"})).unwrap(), SpecShape::OpenApi3);
        assert_eq!(detect_shape(&json!({"swagger": "2.0"})).unwrap(), SpecShape::Swagger2);
        assert!(detect_shape(&json!({"openapi": "4.0"})).is_err());
        assert!(detect_shape(&json!({"swagger": "1.2"})).is_err());
        assert!(detect_shape(&json!({"info": {}})).is_err());
        assert!(detect_shape(&json!(["openapi"])).is_err());
    }

    #[test]
    fn test_load_minimal_openapi() {
        let spec = load_str(r#"{"openapi": "3.0.0", "info": {"title": "T", "version": "1"}, "paths": {}}"#)
            .unwrap();
        assert_eq!(spec.info.title, "T");
        assert!(spec.fixes.is_empty());
    }

    #[test]
    fn test_unparsable_text_is_format_error() {
        let err = load_str("{ not json").unwrap_err();
        assert!(matches!(err, SpecError::SpecFormat(_)));
    }

    #[test]
    fn test_url_item_rejected() {
        let item = SpecItem::new("4.0", "current", SpecSource::Url("https://example.com/spec.json".into()));
        assert!(matches!(item.load(), Err(SpecError::SpecFormat(_))));
    }

    #[test]
    fn test_malformed_canonical_form_rejected() {
        let err = load_value(json!({"openapi": "3.0.0", "paths": {"/x": {"get": {"parameters": [{"in": "query"}]}}}}))
            .unwrap_err();
        assert!(matches!(err, SpecError::SpecFormat(_)));
    }
}
