//! Render Profiles
//!
//! Per-language rendering configuration: the intrinsic type table,
//! collection wrappers, indentation and keyword escaping.
//!
//! Classification (TypeKind, cycle groups) is config-free; only emission
//! consults a profile.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::{Result, SpecError};
use crate::model::Intrinsic;

// =============================================================================
// Language
// =============================================================================

/// Supported target languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    TypeScript,
    Kotlin,
    Swift,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::Python,
        Language::TypeScript,
        Language::Kotlin,
        Language::Swift,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::TypeScript => "typescript",
            Language::Kotlin => "kotlin",
            Language::Swift => "swift",
        }
    }

    /// Source file extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::TypeScript => "ts",
            Language::Kotlin => "kt",
            Language::Swift => "swift",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = SpecError;

    /// Accepts a language name, a common alias, or a file extension
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = s.trim().trim_start_matches('.').to_ascii_lowercase();
        match key.as_str() {
            "python" | "py" => Ok(Language::Python),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "kotlin" | "kt" => Ok(Language::Kotlin),
            "swift" => Ok(Language::Swift),
            _ => Err(SpecError::format(format!("unknown language '{}'", s))),
        }
    }
}

// =============================================================================
// Type Mappings
// =============================================================================

/// Intrinsic type -> language type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMappings(BTreeMap<Intrinsic, String>);

impl TypeMappings {
    pub fn from_pairs(pairs: &[(Intrinsic, &str)]) -> Self {
        Self(pairs.iter().map(|(i, t)| (*i, t.to_string())).collect())
    }

    pub fn get(&self, intrinsic: Intrinsic) -> Option<&str> {
        self.0.get(&intrinsic).map(String::as_str)
    }

    pub fn set(&mut self, intrinsic: Intrinsic, language_type: impl Into<String>) {
        self.0.insert(intrinsic, language_type.into());
    }

    pub fn remove(&mut self, intrinsic: Intrinsic) -> Option<String> {
        self.0.remove(&intrinsic)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply overrides keyed by intrinsic name. Unknown names are skipped.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, String>) {
        for (name, language_type) in overrides {
            match Intrinsic::from_name(name) {
                Some(intrinsic) => self.set(intrinsic, language_type.clone()),
                None => warn!(intrinsic = %name, "ignoring override for unknown intrinsic"),
            }
        }
    }
}

// =============================================================================
// Render Profile
// =============================================================================

/// Language-specific rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderProfile {
    /// Language identifier
    pub language: Language,

    /// Intrinsic type table
    pub types: TypeMappings,

    /// One level of indentation
    pub indent: String,

    /// Prefix or suffix used to escape reserved words
    pub keyword_escape: String,
}

impl RenderProfile {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Python => Self::python(),
            Language::TypeScript => Self::typescript(),
            Language::Kotlin => Self::kotlin(),
            Language::Swift => Self::swift(),
        }
    }

    pub fn python() -> Self {
        use Intrinsic::*;
        Self {
            language: Language::Python,
            types: TypeMappings::from_pairs(&[
                (String, "str"),
                (Boolean, "bool"),
                (Integer, "int"),
                (Int64, "int"),
                (Float, "float"),
                (Double, "float"),
                (Datetime, "datetime.datetime"),
                (Date, "datetime.datetime"),
                (Uri, "str"),
                (Email, "str"),
                (Password, "str"),
                (Uuid, "str"),
                (Hostname, "str"),
                (Ipv4, "str"),
                (Ipv6, "str"),
                (Byte, "bytes"),
                (Binary, "bytes"),
                (Any, "Any"),
                (Void, "None"),
            ]),
            indent: "    ".to_string(),
            keyword_escape: "_".to_string(),
        }
    }

    pub fn typescript() -> Self {
        use Intrinsic::*;
        Self {
            language: Language::TypeScript,
            types: TypeMappings::from_pairs(&[
                (String, "string"),
                (Boolean, "boolean"),
                (Integer, "number"),
                (Int64, "number"),
                (Float, "number"),
                (Double, "number"),
                (Datetime, "Date"),
                (Date, "Date"),
                (Uri, "Url"),
                (Email, "string"),
                (Password, "Password"),
                (Uuid, "string"),
                (Hostname, "string"),
                (Ipv4, "string"),
                (Ipv6, "string"),
                (Byte, "binary"),
                (Binary, "binary"),
                (Any, "any"),
                (Void, "void"),
            ]),
            indent: "  ".to_string(),
            keyword_escape: "_".to_string(),
        }
    }

    pub fn kotlin() -> Self {
        use Intrinsic::*;
        Self {
            language: Language::Kotlin,
            types: TypeMappings::from_pairs(&[
                (String, "String"),
                (Boolean, "Boolean"),
                (Integer, "Long"),
                (Int64, "Long"),
                (Float, "Float"),
                (Double, "Double"),
                (Datetime, "Date"),
                (Date, "Date"),
                (Uri, "UriString"),
                (Email, "String"),
                (Password, "Password"),
                (Uuid, "String"),
                (Hostname, "String"),
                (Ipv4, "String"),
                (Ipv6, "String"),
                (Byte, "ByteArray"),
                (Binary, "ByteArray"),
                (Any, "Any"),
                (Void, "Void"),
            ]),
            indent: "    ".to_string(),
            keyword_escape: "`".to_string(),
        }
    }

    pub fn swift() -> Self {
        use Intrinsic::*;
        Self {
            language: Language::Swift,
            types: TypeMappings::from_pairs(&[
                (String, "String"),
                (Boolean, "Bool"),
                (Integer, "Int64"),
                (Int64, "Int64"),
                (Float, "Float"),
                (Double, "Double"),
                (Datetime, "Date"),
                (Date, "Date"),
                (Uri, "URI"),
                (Email, "String"),
                (Password, "Password"),
                (Uuid, "String"),
                (Hostname, "String"),
                (Ipv4, "String"),
                (Ipv6, "String"),
                (Byte, "Data"),
                (Binary, "Data"),
                (Any, "AnyCodable"),
                (Void, "Voidable"),
            ]),
            indent: "    ".to_string(),
            keyword_escape: "`".to_string(),
        }
    }
}

// =============================================================================
// Render Helpers
// =============================================================================

impl RenderProfile {
    /// Language type for an intrinsic; a missing entry cannot be rendered
    pub fn intrinsic(&self, intrinsic: Intrinsic) -> Result<&str> {
        self.types
            .get(intrinsic)
            .ok_or_else(|| SpecError::unsupported(self.language.name(), intrinsic.name()))
    }

    pub fn is_keyword(&self, name: &str) -> bool {
        let keywords = match self.language {
            Language::Python => PYTHON_KEYWORDS,
            Language::TypeScript => TS_KEYWORDS,
            Language::Kotlin => KOTLIN_KEYWORDS,
            Language::Swift => SWIFT_KEYWORDS,
        };
        keywords.contains(&name)
    }

    /// Escape a keyword if needed
    pub fn escape_keyword(&self, name: &str) -> String {
        if !self.is_keyword(name) {
            return name.to_string();
        }
        match self.language {
            Language::Python => format!("{}{}", name, self.keyword_escape),
            Language::TypeScript => format!("{}{}", self.keyword_escape, name),
            Language::Kotlin | Language::Swift => {
                format!("{}{}{}", self.keyword_escape, name, self.keyword_escape)
            }
        }
    }

    /// `depth` levels of indentation
    pub fn indent(&self, depth: usize) -> String {
        self.indent.repeat(depth)
    }

    /// Wrap a type in a list
    pub fn wrap_array(&self, type_str: &str) -> String {
        match self.language {
            Language::Python => format!("Sequence[{}]", type_str),
            Language::TypeScript => format!("{}[]", type_str),
            Language::Kotlin => format!("Array<{}>", type_str),
            Language::Swift => format!("[{}]", type_str),
        }
    }

    /// Wrap a type in a list sent as one delimited value
    pub fn wrap_delim_array(&self, type_str: &str) -> String {
        match self.language {
            Language::Python => format!("DelimSequence[{}]", type_str),
            Language::TypeScript | Language::Kotlin | Language::Swift => {
                format!("DelimArray<{}>", type_str)
            }
        }
    }

    /// Wrap a type in a string-keyed map
    pub fn wrap_map(&self, value_type: &str) -> String {
        match self.language {
            Language::Python => format!("MutableMapping[str, {}]", value_type),
            Language::TypeScript => format!("IDictionary<{}>", value_type),
            Language::Kotlin => format!("Map<String,{}>", value_type),
            Language::Swift => format!("StringDictionary<{}>", value_type),
        }
    }

    /// Wrap a type to make it optional
    pub fn wrap_optional(&self, type_str: &str) -> String {
        match self.language {
            Language::Python => format!("Optional[{}]", type_str),
            // TypeScript marks the member itself optional
            Language::TypeScript => type_str.to_string(),
            Language::Kotlin | Language::Swift => format!("{}?", type_str),
        }
    }
}

// =============================================================================
// Keywords
// =============================================================================

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break",
    "class", "continue", "def", "del", "elif", "else", "except", "finally",
    "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal",
    "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

const TS_KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "export", "extends", "false",
    "finally", "for", "function", "if", "import", "in", "instanceof", "new",
    "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "implements", "interface",
    "let", "package", "private", "protected", "public", "static", "yield",
];

const KOTLIN_KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun",
    "if", "in", "interface", "is", "null", "object", "package", "return",
    "super", "this", "throw", "true", "try", "typealias", "typeof", "val",
    "var", "when", "while",
];

const SWIFT_KEYWORDS: &[&str] = &[
    "associatedtype", "class", "deinit", "enum", "extension", "fileprivate",
    "func", "import", "init", "inout", "internal", "let", "open", "operator",
    "private", "protocol", "public", "rethrows", "static", "struct",
    "subscript", "typealias", "var", "break", "case", "continue", "default",
    "defer", "do", "else", "fallthrough", "for", "guard", "if", "in",
    "repeat", "return", "switch", "where", "while", "as", "Any", "catch",
    "false", "is", "nil", "super", "self", "Self", "throw", "throws", "true",
    "try", "Type", "Protocol",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_are_complete() {
        for language in Language::ALL {
            let profile = RenderProfile::for_language(language);
            for intrinsic in Intrinsic::ALL {
                assert!(
                    profile.intrinsic(intrinsic).is_ok(),
                    "{} lacks {}",
                    language,
                    intrinsic
                );
            }
        }
    }

    #[test]
    fn test_missing_mapping_is_unsupported() {
        let mut profile = RenderProfile::kotlin();
        profile.types.remove(Intrinsic::Binary);
        let err = profile.intrinsic(Intrinsic::Binary).unwrap_err();
        assert!(matches!(
            err,
            SpecError::UnsupportedType { ref language, ref type_name }
                if language == "kotlin" && type_name == "binary"
        ));
    }

    #[test]
    fn test_keyword_escape() {
        assert_eq!(RenderProfile::python().escape_keyword("from"), "from_");
        assert_eq!(RenderProfile::typescript().escape_keyword("delete"), "_delete");
        assert_eq!(RenderProfile::kotlin().escape_keyword("object"), "`object`");
        assert_eq!(RenderProfile::swift().escape_keyword("protocol"), "`protocol`");
        assert_eq!(RenderProfile::swift().escape_keyword("name"), "name");
    }

    #[test]
    fn test_wrap_containers() {
        let ts = RenderProfile::typescript();
        assert_eq!(ts.wrap_array("number"), "number[]");
        assert_eq!(ts.wrap_map("boolean"), "IDictionary<boolean>");

        let py = RenderProfile::python();
        assert_eq!(py.wrap_map("bool"), "MutableMapping[str, bool]");
        assert_eq!(py.wrap_optional("str"), "Optional[str]");

        let swift = RenderProfile::swift();
        assert_eq!(swift.wrap_array("Int64"), "[Int64]");
        assert_eq!(swift.wrap_optional("Int64"), "Int64?");
    }

    #[test]
    fn test_overrides() {
        let mut types = RenderProfile::typescript().types;
        let overrides: BTreeMap<String, String> = [
            ("datetime".to_string(), "string".to_string()),
            ("nonsense".to_string(), "x".to_string()),
        ]
        .into_iter()
        .collect();
        types.apply_overrides(&overrides);
        assert_eq!(types.get(Intrinsic::Datetime), Some("string"));
        assert_eq!(types.len(), Intrinsic::ALL.len());
    }

    #[test]
    fn test_language_parse() {
        assert_eq!("ts".parse::<Language>().unwrap(), Language::TypeScript);
        assert_eq!(".kt".parse::<Language>().unwrap(), Language::Kotlin);
        assert_eq!("Python".parse::<Language>().unwrap(), Language::Python);
        assert!("cobol".parse::<Language>().is_err());
    }
}
