use crate::error::{Error, Result};
use crate::renderer::RenderOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Template engine configuration
///
/// Loaded from TOML; every field has a default so an empty file is valid.
///
/// ```toml
/// directory = "templates"
/// extension = "tpl"
/// strict_missing = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base directory templates are loaded from
    #[serde(default = "default_directory")]
    pub directory: String,

    /// Extension appended to template names that have none
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Fail on value tags whose path is absent instead of emitting nothing
    #[serde(default)]
    pub strict_missing: bool,
}

fn default_directory() -> String {
    "templates".to_string()
}
fn default_extension() -> String {
    "tpl".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            extension: default_extension(),
            strict_missing: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    ///
    /// A relative `directory` is resolved against the config file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let content = fs::read_to_string(path_ref).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path_ref.display(),
                e
            ))
        })?;

        let mut config = Self::from_toml_str(&content)
            .map_err(|e| e.with_context(format!("in config file '{}'", path_ref.display())))?;

        if let Some(parent_dir) = path_ref.parent() {
            config.resolve_directory(parent_dir);
        }

        log::debug!(
            "Successfully loaded configuration from: {}",
            path_ref.display()
        );

        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content).map_err(|e| {
            Error::config(format!("Failed to parse configuration: {}. Check TOML syntax.", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    fn resolve_directory(&mut self, base: &Path) {
        let directory = Path::new(&self.directory);
        if directory.is_relative() && !base.as_os_str().is_empty() {
            self.directory = base.join(directory).to_string_lossy().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.directory.trim().is_empty() {
            return Err(Error::config("Template directory cannot be empty"));
        }

        if self.extension.starts_with('.') {
            return Err(Error::config(format!(
                "Template extension '{}' must not start with a dot",
                self.extension
            )));
        }

        Ok(())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            strict_missing: self.strict_missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.directory, "templates");
        assert_eq!(config.extension, "tpl");
        assert!(!config.strict_missing);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str("strict_missing = true\nextension = \"html\"")
            .unwrap();
        assert_eq!(config.directory, "templates");
        assert_eq!(config.extension, "html");
        assert!(config.render_options().strict_missing);
    }

    #[test]
    fn test_invalid_config() {
        let err = EngineConfig::from_toml_str("directory = 42").unwrap_err();
        assert_eq!(err.error_code(), "E_CONFIG");

        assert!(EngineConfig::from_toml_str("directory = \"\"").is_err());
        assert!(EngineConfig::from_toml_str("extension = \".tpl\"").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file("/nonexistent/tagtree.toml").unwrap_err();
        assert_eq!(err.error_code(), "E_CONFIG");
    }

    #[test]
    fn test_relative_directory_follows_config_file() {
        let mut config = EngineConfig::default();
        config.resolve_directory(Path::new("/srv/site"));
        assert_eq!(Path::new(&config.directory), Path::new("/srv/site/templates"));

        let mut config = EngineConfig {
            directory: "/abs/templates".to_string(),
            ..EngineConfig::default()
        };
        config.resolve_directory(Path::new("/srv/site"));
        assert_eq!(config.directory, "/abs/templates");
    }
}
