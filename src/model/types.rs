//! Type vocabulary of the API model
//!
//! Every type the model knows about is a [`Type`] entry keyed by its
//! canonical name. Types reference each other by name, never by pointer,
//! so recursive and mutually recursive schemas are plain data.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Intrinsic Types
// =============================================================================

/// Fixed vocabulary of built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intrinsic {
    String,
    Boolean,
    Integer,
    Int64,
    Float,
    Double,
    Datetime,
    Date,
    Uri,
    Email,
    Password,
    Uuid,
    Hostname,
    Ipv4,
    Ipv6,
    Byte,
    Binary,
    Any,
    Void,
}

impl Intrinsic {
    pub const ALL: [Intrinsic; 19] = [
        Intrinsic::String,
        Intrinsic::Boolean,
        Intrinsic::Integer,
        Intrinsic::Int64,
        Intrinsic::Float,
        Intrinsic::Double,
        Intrinsic::Datetime,
        Intrinsic::Date,
        Intrinsic::Uri,
        Intrinsic::Email,
        Intrinsic::Password,
        Intrinsic::Uuid,
        Intrinsic::Hostname,
        Intrinsic::Ipv4,
        Intrinsic::Ipv6,
        Intrinsic::Byte,
        Intrinsic::Binary,
        Intrinsic::Any,
        Intrinsic::Void,
    ];

    /// Canonical type name in the model
    pub fn name(self) -> &'static str {
        match self {
            Intrinsic::String => "string",
            Intrinsic::Boolean => "boolean",
            Intrinsic::Integer => "integer",
            Intrinsic::Int64 => "int64",
            Intrinsic::Float => "float",
            Intrinsic::Double => "double",
            Intrinsic::Datetime => "datetime",
            Intrinsic::Date => "date",
            Intrinsic::Uri => "uri",
            Intrinsic::Email => "email",
            Intrinsic::Password => "password",
            Intrinsic::Uuid => "uuid",
            Intrinsic::Hostname => "hostname",
            Intrinsic::Ipv4 => "ipv4",
            Intrinsic::Ipv6 => "ipv6",
            Intrinsic::Byte => "byte",
            Intrinsic::Binary => "binary",
            Intrinsic::Any => "any",
            Intrinsic::Void => "void",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|i| i.name() == name)
    }

    /// Map an OpenAPI `format` value onto the vocabulary
    pub fn from_format(format: &str) -> Option<Self> {
        match format {
            "int32" => Some(Intrinsic::Integer),
            "date-time" => Some(Intrinsic::Datetime),
            "url" => Some(Intrinsic::Uri),
            "ipv4" | "ip" => Some(Intrinsic::Ipv4),
            other => Self::from_name(other),
        }
    }
}

impl fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Enum Values
// =============================================================================

/// A single member of an enumerated type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Text(String),
    Number(serde_json::Number),
}

impl EnumValue {
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(EnumValue::Text(s.clone())),
            serde_json::Value::Number(n) => Some(EnumValue::Number(n.clone())),
            serde_json::Value::Bool(b) => Some(EnumValue::Text(b.to_string())),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, EnumValue::Number(_))
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::Text(s) => f.write_str(s),
            EnumValue::Number(n) => write!(f, "{}", n),
        }
    }
}

// =============================================================================
// Type Kinds
// =============================================================================

/// Structural classification of a type.
///
/// Collection kinds name their element type; the element is looked up
/// in the owning model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeKind {
    Intrinsic { intrinsic: Intrinsic },
    Complex { properties: IndexMap<String, Property> },
    Array { element: String },
    DelimArray { element: String },
    Hash { element: String },
    Enum { element: String, values: Vec<EnumValue> },
}

impl TypeKind {
    /// Short label used in reports and type summaries
    pub fn label(&self) -> &'static str {
        match self {
            TypeKind::Intrinsic { .. } => "intrinsic",
            TypeKind::Complex { .. } => "complex",
            TypeKind::Array { .. } => "array",
            TypeKind::DelimArray { .. } => "delimArray",
            TypeKind::Hash { .. } => "hash",
            TypeKind::Enum { .. } => "enum",
        }
    }
}

/// Where a type entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeOrigin {
    /// Built-in vocabulary type
    Intrinsic,
    /// Named schema under `components.schemas`
    Schema,
    /// Deduplicated inline object or enum
    Anonymous,
    /// Collection wrapper created on demand (`Foo[]`, `Hash[Foo]`)
    Collection,
    /// Derived request shape holding only the writeable properties
    Writeable,
}

// =============================================================================
// Type
// =============================================================================

/// A node of the type graph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Type {
    /// Canonical, language-safe name
    pub name: String,
    /// Name as it appears on the wire
    pub json_name: String,
    #[serde(flatten)]
    pub kind: TypeKind,
    pub origin: TypeOrigin,
    pub description: String,
    pub title: String,
    pub status: String,
    pub deprecated: bool,
    pub default: Option<String>,
    /// All properties read-only, or a collection of read-only elements
    pub read_only: bool,
    /// Member of a reference cycle
    pub recursive: bool,
}

impl Type {
    pub fn new(name: impl Into<String>, kind: TypeKind, origin: TypeOrigin) -> Self {
        let name = name.into();
        Self {
            json_name: name.clone(),
            name,
            kind,
            origin,
            description: String::new(),
            title: String::new(),
            status: String::new(),
            deprecated: false,
            default: None,
            read_only: false,
            recursive: false,
        }
    }

    pub fn intrinsic(intrinsic: Intrinsic) -> Self {
        Self::new(intrinsic.name(), TypeKind::Intrinsic { intrinsic }, TypeOrigin::Intrinsic)
    }

    pub fn full_name(&self) -> &str {
        &self.name
    }

    pub fn is_intrinsic(&self) -> bool {
        matches!(self.kind, TypeKind::Intrinsic { .. })
    }

    pub fn is_complex(&self) -> bool {
        matches!(self.kind, TypeKind::Complex { .. })
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum { .. })
    }

    pub fn as_intrinsic(&self) -> Option<Intrinsic> {
        match self.kind {
            TypeKind::Intrinsic { intrinsic } => Some(intrinsic),
            _ => None,
        }
    }

    /// Element type name of a collection
    pub fn element_type(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Array { element }
            | TypeKind::DelimArray { element }
            | TypeKind::Hash { element } => Some(element),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.element_type().is_some()
    }

    /// A named collection inside a reference cycle. Expanding it would not
    /// terminate, so it is only ever referred to by name.
    pub fn is_recursive_alias(&self) -> bool {
        self.recursive && self.is_collection()
    }

    /// Declared properties, in declaration order. Empty for non-complex types.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        let props = match &self.kind {
            TypeKind::Complex { properties } => Some(properties),
            _ => None,
        };
        props.into_iter().flat_map(|p| p.values())
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        match &self.kind {
            TypeKind::Complex { properties } => properties.get(name),
            _ => None,
        }
    }

    pub fn enum_values(&self) -> &[EnumValue] {
        match &self.kind {
            TypeKind::Enum { values, .. } => values,
            _ => &[],
        }
    }

    /// Names of every type this type refers to directly
    pub fn references(&self) -> Vec<&str> {
        match &self.kind {
            TypeKind::Intrinsic { .. } => Vec::new(),
            TypeKind::Complex { properties } => {
                properties.values().map(|p| p.type_name.as_str()).collect()
            }
            TypeKind::Array { element }
            | TypeKind::DelimArray { element }
            | TypeKind::Hash { element }
            | TypeKind::Enum { element, .. } => vec![element.as_str()],
        }
    }
}

// =============================================================================
// Property
// =============================================================================

/// A named, typed member of a complex type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    pub json_name: String,
    /// Name of the owning type
    pub owner: String,
    pub type_name: String,
    pub description: String,
    pub required: bool,
    pub read_only: bool,
    pub write_only: bool,
    pub nullable: bool,
    pub deprecated: bool,
    pub status: String,
}

impl Property {
    /// `Owner.property`
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.owner, self.name)
    }

    /// Compact summary used by the differ
    pub fn summary(&self) -> String {
        let mut out = self.type_name.clone();
        if self.required {
            out.push_str(" required");
        }
        if self.read_only {
            out.push_str(" readonly");
        }
        if self.nullable {
            out.push_str(" nullable");
        }
        out
    }
}
