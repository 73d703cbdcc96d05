use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::i18n::{self, Language};

const SETTINGS_FILE: &str = "settings.toml";

/// Contents of `settings.toml`. Every field is optional on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `invoice-template-<n>.html.tera` overrides. Embedded
    /// templates are used when unset.
    pub template_dir: Option<PathBuf>,
    pub default_language: String,
    /// `None` means strict in debug builds, lenient in release builds.
    pub strict_translations: Option<bool>,
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template_dir: None,
            default_language: i18n::DEFAULT_LANGUAGE.code().to_string(),
            strict_translations: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    pub fn language(&self) -> Language {
        i18n::resolve_language(Some(&self.default_language))
    }

    pub fn strict_translations(&self) -> bool {
        self.strict_translations.unwrap_or(cfg!(debug_assertions))
    }

    /// Loads settings from `path`, falling back to defaults when the file does
    /// not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&settings_path()?)
    }

    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = settings_path()?;
        self.save_to(&path)?;
        Ok(path)
    }
}

pub fn settings_path() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("com", "invoice-templates", "app")
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
        .ok_or(ConfigError::ConfigDirNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.language(), Language::En);
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        let settings = Settings {
            template_dir: Some(dir.path().join("templates")),
            default_language: "he".into(),
            strict_translations: Some(false),
            output_dir: dir.path().join("out"),
        };
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.language(), Language::He);
        assert!(!loaded.strict_translations());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "default_language = \"ar\"\n").unwrap();
        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.language(), Language::Ar);
        assert_eq!(loaded.template_dir, None);
    }

    #[test]
    fn bad_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "default_language = [").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(ConfigError::TomlParse { .. })));
    }
}
