//! API Model
//!
//! The resolved, immutable graph of types, methods and tags built from a
//! loaded specification. All cross references are canonical names that
//! index into the model's own maps, so the model is plain owned data and
//! can be shared freely between threads.

pub mod analysis;
pub mod method;
pub mod names;
mod resolver;
pub mod types;

pub use analysis::TypeGraph;
pub use method::{
    HttpMethod, Method, MethodContract, MethodResponse, ParamLocation, Parameter, ResponseMode,
    Tag, WithoutDescription,
};
pub use resolver::resolve;
pub use types::{EnumValue, Intrinsic, Property, Type, TypeKind, TypeOrigin};

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::error::{Result, SpecError};
use crate::spec::{self, IntermediateSpec, SpecItem};

/// Resolved API model
#[derive(Debug, Clone)]
pub struct ApiModel {
    pub(crate) title: String,
    pub(crate) version: String,
    pub(crate) description: String,
    pub(crate) types: BTreeMap<String, Type>,
    pub(crate) methods: BTreeMap<String, Method>,
    pub(crate) tags: BTreeMap<String, Tag>,
    /// source type name -> writeable type name
    pub(crate) writeable: BTreeMap<String, String>,
    pub(crate) cycle_groups: Vec<Vec<String>>,
    pub(crate) fixes: Vec<String>,
}

#[derive(Serialize)]
struct Fingerprint<'a> {
    types: &'a BTreeMap<String, Type>,
    methods: &'a BTreeMap<String, Method>,
    tags: &'a BTreeMap<String, Tag>,
}

impl ApiModel {
    /// Build a model from a loaded specification
    pub fn from_spec(spec: &IntermediateSpec) -> Result<Self> {
        resolve(spec)
    }

    /// Load and resolve JSON text in one step
    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_spec(&spec::load_str(text)?)
    }

    pub fn from_item(item: &SpecItem) -> Result<Self> {
        Self::from_spec(&item.load()?)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Fixes applied while upgrading the source document
    pub fn fixes(&self) -> &[String] {
        &self.fixes
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn types(&self) -> &BTreeMap<String, Type> {
        &self.types
    }

    pub fn methods(&self) -> &BTreeMap<String, Method> {
        &self.methods
    }

    pub fn tags(&self) -> &BTreeMap<String, Tag> {
        &self.tags
    }

    pub fn type_by_name(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Look up a type that must exist
    pub fn require_type(&self, name: &str) -> Result<&Type> {
        self.types.get(name).ok_or_else(|| SpecError::unresolved(name))
    }

    /// Methods of a tag, in declaration order
    pub fn tag_methods(&self, tag: &str) -> Vec<&Method> {
        self.tags
            .get(tag)
            .map(|t| t.methods.iter().filter_map(|m| self.methods.get(m)).collect())
            .unwrap_or_default()
    }

    // =========================================================================
    // Type Helpers
    // =========================================================================

    /// Element type of a collection, or the type itself
    pub fn pick_type<'a>(&'a self, ty: &'a Type) -> &'a Type {
        ty.element_type()
            .and_then(|element| self.types.get(element))
            .unwrap_or(ty)
    }

    /// Innermost non-collection type
    pub fn base_type<'a>(&'a self, ty: &'a Type) -> &'a Type {
        let name = analysis::base_type(&self.types, &ty.name);
        self.types.get(name).unwrap_or(ty)
    }

    /// `Write<Name>` type for a complex type with some read-only properties
    pub fn writeable_type(&self, name: &str) -> Option<&Type> {
        self.writeable.get(name).and_then(|w| self.types.get(w))
    }

    /// Groups of mutually recursive types, including self-referencing ones
    pub fn cycle_groups(&self) -> &[Vec<String>] {
        &self.cycle_groups
    }

    /// SHA256 over the canonical serialization of the model
    pub fn fingerprint(&self) -> Result<String> {
        let canonical = serde_json::to_vec(&Fingerprint {
            types: &self.types,
            methods: &self.methods,
            tags: &self.tags,
        })?;
        Ok(format!("{:x}", Sha256::digest(&canonical)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_model_is_send_sync() {
        assert_send_sync::<ApiModel>();
    }

    #[test]
    fn test_pick_type() {
        let api = ApiModel::from_json(
            r#"{
                "openapi": "3.0.0",
                "info": { "title": "T", "version": "1" },
                "paths": {},
                "components": { "schemas": {
                    "Thing": { "type": "object", "properties": {
                        "tags": { "type": "array", "items": { "type": "string" } },
                        "grid": { "type": "array", "items": { "type": "array", "items": { "type": "integer" } } }
                    } }
                } }
            }"#,
        )
        .unwrap();
        let thing = api.type_by_name("Thing").unwrap();
        assert_eq!(api.pick_type(thing).name, "Thing");

        let tags = api.type_by_name("string[]").unwrap();
        assert_eq!(api.pick_type(tags).name, "string");

        let grid = api.type_by_name("integer[][]").unwrap();
        assert_eq!(api.pick_type(grid).name, "integer[]");
        assert_eq!(api.base_type(grid).name, "integer");
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let text = r#"{"openapi": "3.0.0", "info": {"title": "T", "version": "1"}, "paths": {}}"#;
        let a = ApiModel::from_json(text).unwrap();
        let b = ApiModel::from_json(text).unwrap();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 64);
    }
}
