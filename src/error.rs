//! Error types for template resolution, translation lookup and formatting.

use std::error::Error as StdError;
use std::path::PathBuf;

/// Errors raised while mapping an identifier to a renderer or loading it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TemplateError {
    /// The identifier has no matching renderer
    #[error("Template '{0}' not found")]
    NotFound(String),

    /// A known template could not be loaded; the caller may retry
    #[error("Failed to load template {template}: {message}")]
    Load { template: u32, message: String },
}

impl TemplateError {
    /// Identifier shown when neither the route nor the invoice names a template.
    pub const NO_IDENTIFIER: &'static str = "<none>";

    pub fn not_selected() -> Self {
        Self::NotFound(Self::NO_IDENTIFIER.to_string())
    }

    pub fn load(template: u32, message: impl Into<String>) -> Self {
        Self::Load {
            template,
            message: message.into(),
        }
    }
}

/// A template asked for a key the dictionary does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslationError {
    #[error("Missing translation key '{key}' for language '{language}'")]
    MissingKey { language: String, key: String },

    #[error("Unsupported language '{0}'")]
    UnsupportedLanguage(String),
}

/// Invalid input fed into date or number formatting.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("Invalid date: '{0}'")]
    InvalidDate(String),

    #[error("Invalid number: '{0}'")]
    InvalidNumber(String),
}

/// Everything that can stop a document from rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Template engine error: {0}")]
    Engine(#[source] tera::Error),
}

impl From<tera::Error> for RenderError {
    fn from(err: tera::Error) -> Self {
        // Translation failures raised inside the `t` function come back wrapped
        // in one or more layers of tera errors.
        let mut source: Option<&(dyn StdError + 'static)> = err.source();
        while let Some(inner) = source {
            if let Some(missing) = inner.downcast_ref::<TranslationError>() {
                return RenderError::Translation(missing.clone());
            }
            source = inner.source();
        }
        RenderError::Engine(err)
    }
}

/// Errors that can occur while loading or saving settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error in {path}: {source}")]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    ConfigDirNotFound,
}
