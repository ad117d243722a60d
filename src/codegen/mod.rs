//! Code Generation
//!
//! Renders declarations for the types and methods of an [`ApiModel`].
//!
//! Architecture:
//! - [`CodeGenerator`]: one implementation per target language
//! - [`RenderProfile`]: the language's type table and wrapping rules
//! - [`RenderStack`]: types currently being expanded, so cycles terminate
//! - [`GeneratorRegistry`]: caller-built list of enabled generators
//!
//! Generators are pure: they read the model and return text, and never
//! mutate anything.

pub mod config;
pub mod kotlin;
pub mod python;
pub mod swift;
pub mod typescript;

pub use config::{Language, RenderProfile, TypeMappings};
pub use kotlin::KotlinGenerator;
pub use python::PythonGenerator;
pub use swift::SwiftGenerator;
pub use typescript::TypeScriptGenerator;

use tracing::{debug, warn};

use crate::config::SdkGenConfig;
use crate::error::{Result, SpecError};
use crate::model::names::title_case;
use crate::model::{ApiModel, MethodContract, Type, TypeKind, TypeOrigin};

// =============================================================================
// Generator Trait
// =============================================================================

/// A language backend
pub trait CodeGenerator: Send + Sync {
    fn profile(&self) -> &RenderProfile;

    fn language(&self) -> &str {
        self.profile().language.name()
    }

    fn extension(&self) -> &str {
        self.profile().language.extension()
    }

    /// Declaration of one type
    fn declare_type(&self, api: &ApiModel, ty: &Type, comment: bool) -> Result<String>;

    /// Declaration of one method signature
    fn declare_method(&self, api: &ApiModel, method: &dyn MethodContract, comment: bool) -> Result<String>;

    /// Anonymous complex types are expanded at each use instead of declared
    fn inlines_anonymous(&self) -> bool {
        false
    }

    fn models_prologue(&self, _api: &ApiModel) -> String {
        String::new()
    }

    fn models_epilogue(&self, _api: &ApiModel) -> String {
        String::new()
    }

    fn methods_prologue(&self, _api: &ApiModel) -> String {
        String::new()
    }

    fn methods_epilogue(&self, _api: &ApiModel) -> String {
        String::new()
    }
}

// =============================================================================
// Render Stack
// =============================================================================

/// Names of the types being expanded in the current render call.
///
/// A type already on the stack is rendered by name, which bounds the
/// expansion depth by the number of distinct types.
#[derive(Debug, Default)]
pub struct RenderStack {
    names: Vec<String>,
}

impl RenderStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `name` unless it is already being rendered
    pub fn enter(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    pub fn leave(&mut self) {
        self.names.pop();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn depth(&self) -> usize {
        self.names.len()
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Name used when declaring a type.
///
/// Collection wrappers and intrinsics have no identifier of their own, so
/// one is derived from the element (`Foo[]` -> `FooArray`).
pub fn declared_name(api: &ApiModel, ty: &Type) -> String {
    let element_alias = |element: &str| {
        api.type_by_name(element)
            .map(|t| title_case(&declared_name(api, t)))
            .unwrap_or_else(|| title_case(element))
    };
    match (&ty.origin, &ty.kind) {
        (TypeOrigin::Collection, TypeKind::Array { element }) => format!("{}Array", element_alias(element)),
        (TypeOrigin::Collection, TypeKind::DelimArray { element }) => {
            format!("{}DelimArray", element_alias(element))
        }
        (TypeOrigin::Collection, TypeKind::Hash { element }) => format!("{}Hash", element_alias(element)),
        (TypeOrigin::Intrinsic, _) => title_case(&ty.name),
        _ => ty.name.clone(),
    }
}

/// Wrap `text` into comment lines: `open`, then `prefix` per line, then `close`.
///
/// Empty text yields an empty string.
pub fn comment_block(text: &str, indent: &str, open: &str, prefix: &str, close: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    if !open.is_empty() {
        out.push_str(&format!("{}{}\n", indent, open));
    }
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            out.push_str(&format!("{}{}\n", indent, prefix.trim_end()));
        } else {
            out.push_str(&format!("{}{}{}\n", indent, prefix, line));
        }
    }
    if !close.is_empty() {
        out.push_str(&format!("{}{}\n", indent, close));
    }
    out
}

/// Quoted string literal with backslash escapes
pub fn string_literal(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Description plus a `VERB endpoint -> return` line for method headers
pub fn method_header(method: &dyn MethodContract) -> String {
    let mut lines = Vec::new();
    let summary = method.summary().trim();
    if !summary.is_empty() {
        lines.push(format!("### {}", summary));
        lines.push(String::new());
    }
    let description = method.description().trim();
    if !description.is_empty() {
        lines.push(description.to_string());
        lines.push(String::new());
    }
    if method.deprecated() {
        lines.push("@deprecated".to_string());
        lines.push(String::new());
    }
    lines.push(format!(
        "{} {} -> {}",
        method.http_method(),
        method.endpoint(),
        method.return_type()
    ));
    lines.join("\n")
}

/// Type name to use for a body parameter: the writeable variant when one exists
pub fn body_type_name<'a>(api: &'a ApiModel, type_name: &'a str) -> &'a str {
    api.writeable_type(type_name)
        .map(|w| w.name.as_str())
        .unwrap_or(type_name)
}

/// Whether `generate_models` emits a declaration for this type
fn is_declared(generator: &dyn CodeGenerator, ty: &Type) -> bool {
    match ty.origin {
        TypeOrigin::Intrinsic | TypeOrigin::Collection => false,
        // recursive shapes need a name to refer back to
        TypeOrigin::Anonymous => !(ty.is_complex() && !ty.recursive && generator.inlines_anonymous()),
        TypeOrigin::Schema | TypeOrigin::Writeable => true,
    }
}

// =============================================================================
// Whole-file Generation
// =============================================================================

/// An item left out of a generated file
#[derive(Debug)]
pub struct SkippedItem {
    pub name: String,
    pub error: SpecError,
}

/// Text of one generated source file
#[derive(Debug)]
pub struct GeneratedFile {
    pub language: String,
    pub extension: String,
    pub code: String,
    pub declared: usize,
    pub skipped: Vec<SkippedItem>,
}

impl GeneratedFile {
    fn new(generator: &dyn CodeGenerator) -> Self {
        Self {
            language: generator.language().to_string(),
            extension: generator.extension().to_string(),
            code: String::new(),
            declared: 0,
            skipped: Vec::new(),
        }
    }

    fn push(&mut self, name: &str, rendered: Result<String>) -> Result<()> {
        match rendered {
            Ok(text) => {
                self.code.push_str(&text);
                self.code.push('\n');
                self.declared += 1;
                Ok(())
            }
            Err(error) if error.is_recoverable() => {
                warn!(language = %self.language, item = name, %error, "skipping item");
                self.skipped.push(SkippedItem {
                    name: name.to_string(),
                    error,
                });
                Ok(())
            }
            Err(error) => Err(error),
        }
    }
}

/// Every declarable type, alphabetically, after the language prologue
pub fn generate_models(generator: &dyn CodeGenerator, api: &ApiModel, comment: bool) -> Result<GeneratedFile> {
    let mut file = GeneratedFile::new(generator);
    file.code.push_str(&generator.models_prologue(api));
    for ty in api.types().values().filter(|t| is_declared(generator, t)) {
        file.push(&ty.name, generator.declare_type(api, ty, comment))?;
    }
    file.code.push_str(&generator.models_epilogue(api));
    debug!(
        language = %file.language,
        declared = file.declared,
        skipped = file.skipped.len(),
        "generated models"
    );
    Ok(file)
}

/// Every method signature, alphabetically, after the language prologue
pub fn generate_methods(generator: &dyn CodeGenerator, api: &ApiModel, comment: bool) -> Result<GeneratedFile> {
    let mut file = GeneratedFile::new(generator);
    file.code.push_str(&generator.methods_prologue(api));
    for method in api.methods().values() {
        file.push(&method.name, generator.declare_method(api, method, comment))?;
    }
    file.code.push_str(&generator.methods_epilogue(api));
    debug!(
        language = %file.language,
        declared = file.declared,
        skipped = file.skipped.len(),
        "generated methods"
    );
    Ok(file)
}

// =============================================================================
// Generator Registry
// =============================================================================

/// Build the generator for a profile
pub fn generator_for(profile: RenderProfile) -> Box<dyn CodeGenerator> {
    match profile.language {
        Language::Python => Box::new(PythonGenerator::new(profile)),
        Language::TypeScript => Box::new(TypeScriptGenerator::new(profile)),
        Language::Kotlin => Box::new(KotlinGenerator::new(profile)),
        Language::Swift => Box::new(SwiftGenerator::new(profile)),
    }
}

/// Caller-owned list of generators
pub struct GeneratorRegistry {
    generators: Vec<Box<dyn CodeGenerator>>,
}

impl Default for GeneratorRegistry {
    /// Every language with its default profile
    fn default() -> Self {
        Self {
            generators: Language::ALL
                .into_iter()
                .map(|l| generator_for(RenderProfile::for_language(l)))
                .collect(),
        }
    }
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self {
            generators: Vec::new(),
        }
    }

    /// Enabled generators from configuration; all languages when none are listed
    pub fn from_config(config: &SdkGenConfig) -> Self {
        if config.generators.is_empty() {
            return Self::default();
        }
        let mut registry = Self::new();
        for entry in config.generators.iter().filter(|g| g.enabled) {
            registry.register(generator_for(entry.profile()));
        }
        registry
    }

    /// Add a generator, replacing any existing one for the same language
    pub fn register(&mut self, generator: Box<dyn CodeGenerator>) {
        self.generators.retain(|g| g.language() != generator.language());
        self.generators.push(generator);
    }

    /// Look up by language name, alias or file extension
    pub fn find(&self, key: &str) -> Option<&dyn CodeGenerator> {
        let language: Language = key.parse().ok()?;
        self.generators
            .iter()
            .find(|g| g.profile().language == language)
            .map(|g| g.as_ref())
    }

    pub fn languages(&self) -> Vec<&str> {
        self.generators.iter().map(|g| g.language()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn CodeGenerator> {
        self.generators.iter().map(|g| g.as_ref())
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_stack_blocks_reentry() {
        let mut stack = RenderStack::new();
        assert!(stack.enter("Node"));
        assert!(!stack.enter("Node"));
        assert!(stack.enter("Leaf"));
        assert_eq!(stack.depth(), 2);
        stack.leave();
        stack.leave();
        assert!(!stack.contains("Node"));
    }

    #[test]
    fn test_comment_block() {
        assert_eq!(comment_block("", "", "/**", " * ", " */"), "");
        assert_eq!(
            comment_block("first\n\nsecond", "  ", "/**", " * ", " */"),
            "  /**\n   * first\n   *\n   * second\n   */\n"
        );
        assert_eq!(comment_block("one", "", "", "# ", ""), "# one\n");
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal("plain", '"'), "\"plain\"");
        assert_eq!(string_literal("it's", '\''), "'it\\'s'");
        assert_eq!(string_literal("a\\b\nc", '"'), "\"a\\\\b\\nc\"");
    }

    #[test]
    fn test_registry_lookup() {
        let registry = GeneratorRegistry::default();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.find("ts").map(|g| g.language()), Some("typescript"));
        assert_eq!(registry.find("swift").map(|g| g.extension()), Some("swift"));
        assert!(registry.find("cobol").is_none());
    }

    #[test]
    fn test_register_replaces_language() {
        let mut registry = GeneratorRegistry::new();
        registry.register(generator_for(RenderProfile::python()));
        let mut custom = RenderProfile::python();
        custom.indent = "  ".to_string();
        registry.register(generator_for(custom));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find("py").map(|g| g.profile().indent.len()), Some(2));
    }
}
