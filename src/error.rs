//! Error types for specification loading, resolution and generation

use thiserror::Error;

/// Result type for sdk-codegen operations
pub type Result<T> = std::result::Result<T, SpecError>;

/// Errors raised while loading, resolving, generating or exporting
#[derive(Error, Debug)]
pub enum SpecError {
    /// The input document matches no known specification shape
    #[error("Invalid specification format: {0}")]
    SpecFormat(String),

    /// A `$ref` could not be resolved to a registered type
    #[error("Unresolved reference: {reference}")]
    TypeResolution { reference: String },

    /// A generator has no rendering rule for a type
    #[error("{language} generator cannot render type '{type_name}'")]
    UnsupportedType { language: String, type_name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl SpecError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        SpecError::SpecFormat(message.into())
    }

    pub(crate) fn unresolved(reference: impl Into<String>) -> Self {
        SpecError::TypeResolution {
            reference: reference.into(),
        }
    }

    pub(crate) fn unsupported(language: impl Into<String>, type_name: impl Into<String>) -> Self {
        SpecError::UnsupportedType {
            language: language.into(),
            type_name: type_name.into(),
        }
    }

    /// Whether the caller may skip the failing item and continue
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SpecError::UnsupportedType { .. })
    }
}
