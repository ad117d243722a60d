//! Configuration management for sdkgen
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (sdkgen.toml)
//! - Environment variables (SDKGEN__*)
//!
//! ## Example config file (sdkgen.toml):
//! ```toml
//! [[generators]]
//! language = "typescript"
//! indent = 2
//!
//! [generators.types]
//! datetime = "string"
//!
//! [[generators]]
//! language = "swift"
//! enabled = false
//!
//! [diff]
//! format = "markdown"
//! filter = "diffs"
//!
//! [search]
//! criteria = ["method", "name", "description"]
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::codegen::{Language, RenderProfile};
use crate::error::Result;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SdkGenConfig {
    /// Enabled generators; every language with defaults when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generators: Vec<GeneratorConfig>,

    /// Diff settings
    #[serde(default)]
    pub diff: DiffConfig,

    /// Search settings
    #[serde(default)]
    pub search: SearchConfig,
}

/// One generator entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub language: Language,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Spaces per indentation level, overriding the language default
    #[serde(default)]
    pub indent: Option<usize>,

    /// Intrinsic name -> language type overrides
    #[serde(default)]
    pub types: BTreeMap<String, String>,
}

impl GeneratorConfig {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            enabled: true,
            indent: None,
            types: BTreeMap::new(),
        }
    }

    /// Default profile for the language with this entry's overrides applied
    pub fn profile(&self) -> RenderProfile {
        let mut profile = RenderProfile::for_language(self.language);
        if let Some(width) = self.indent {
            profile.indent = " ".repeat(width);
        }
        profile.types.apply_overrides(&self.types);
        profile
    }
}

/// Diff export format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Markdown,
}

/// Which diff rows to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// One-sided methods and every difference
    #[default]
    All,
    /// One-sided methods and matched pairs with at least one difference
    Diffs,
}

/// Diff configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffConfig {
    #[serde(default)]
    pub format: ExportFormat,

    #[serde(default)]
    pub filter: FilterMode,

    /// Keep only rows whose left-side status is this
    #[serde(default)]
    pub status: Option<String>,
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Criterion names used when none are given
    #[serde(default = "default_criteria")]
    pub criteria: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            criteria: default_criteria(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_criteria() -> Vec<String> {
    crate::search::criteria_names(&crate::search::search_all())
}

impl SdkGenConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the defaults
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        for location in ["sdkgen.toml", ".sdkgen.toml", "config/sdkgen.toml"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "sdkgen", "sdkgen") {
            let xdg_config = dirs.config_dir().join("sdkgen.toml");
            if xdg_config.exists() {
                debug!(path = %xdg_config.display(), "reading user config");
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // SDKGEN__DIFF__FORMAT=markdown
        builder = builder.add_source(
            Environment::with_prefix("SDKGEN")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Entry for a language, if configured
    pub fn generator(&self, language: Language) -> Option<&GeneratorConfig> {
        self.generators.iter().find(|g| g.language == language)
    }

    /// Profile for a language: the configured entry, or the defaults
    pub fn profile(&self, language: Language) -> RenderProfile {
        self.generator(language)
            .map(GeneratorConfig::profile)
            .unwrap_or_else(|| RenderProfile::for_language(language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Intrinsic;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SdkGenConfig::default();
        assert!(config.generators.is_empty());
        assert_eq!(config.diff.format, ExportFormat::Csv);
        assert_eq!(config.search.criteria.len(), 10);
    }

    #[test]
    fn test_serialize_config() {
        let mut config = SdkGenConfig::default();
        config.generators.push(GeneratorConfig::new(Language::Kotlin));
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[[generators]]"));
        assert!(toml_str.contains("language = \"kotlin\""));
        assert!(toml_str.contains("[diff]"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[[generators]]
language = "typescript"
indent = 4

[generators.types]
datetime = "string"

[[generators]]
language = "swift"
enabled = false

[diff]
format = "markdown"
filter = "diffs"
"#
        )
        .unwrap();

        let config = SdkGenConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.generators.len(), 2);
        assert!(!config.generators[1].enabled);
        assert_eq!(config.diff.format, ExportFormat::Markdown);
        assert_eq!(config.diff.filter, FilterMode::Diffs);

        let ts = config.profile(Language::TypeScript);
        assert_eq!(ts.indent, "    ");
        assert_eq!(ts.types.get(Intrinsic::Datetime), Some("string"));

        // unconfigured languages keep their defaults
        assert_eq!(config.profile(Language::Python).indent, "    ");
    }

    #[test]
    fn test_save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sdkgen.toml");
        let mut config = SdkGenConfig::default();
        config.diff.status = Some("beta".to_string());
        config.save(&path).unwrap();

        let loaded = SdkGenConfig::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.diff.status.as_deref(), Some("beta"));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SdkGenConfig::load_from(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
