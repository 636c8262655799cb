//! Layered configuration loader.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use heron_telemetry::LogFormat;

use crate::{ConfigError, HeronConfig};

/// Configuration loader.
///
/// Later layers override earlier ones:
/// 1. Defaults (or a preset)
/// 2. A TOML or JSON file or string
/// 3. Environment variables named `PREFIX__SECTION__KEY`
///
/// # Example
///
/// ```no_run
/// use heron_config::ConfigLoader;
///
/// # fn main() -> Result<(), heron_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("heron.toml")?
///     .with_env_prefix("HERON")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: HeronConfig,
    env_prefix: Option<String>,
    file_loaded: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new loader seeded with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HeronConfig::default(),
            env_prefix: None,
            file_loaded: false,
        }
    }

    /// Reset to default values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = HeronConfig::default();
        self
    }

    /// Start from the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use heron_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = HeronConfig::development();
        self
    }

    /// Start from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = HeronConfig::production();
        self
    }

    /// Load a `.toml` or `.json` file, chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed,
    /// has an unsupported extension, or carries unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let file_config = Self::parse_file(&content, path)?;
        self.merge_config(file_config);
        self.file_loaded = true;

        Ok(self)
    }

    /// Load a file if it exists.
    ///
    /// # Errors
    ///
    /// Same as [`with_file`](Self::with_file) when the file exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the named format (`toml` or `json`).
    ///
    /// # Example
    ///
    /// ```
    /// use heron_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [binding]
    ///     validation_status = 400
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.binding.validation_status, 400);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let file_config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::unsupported_format(format)),
        };

        self.merge_config(file_config);
        Ok(self)
    }

    /// Set the environment variable prefix, e.g. `HERON` for
    /// `HERON__BINDING__VALIDATION_STATUS=400`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Whether a file layer was applied.
    pub fn file_loaded(&self) -> bool {
        self.file_loaded
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable cannot be parsed or
    /// the final configuration is invalid.
    pub fn load(mut self) -> Result<HeronConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Return the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> HeronConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<HeronConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            other => Err(ConfigError::unsupported_format(other.unwrap_or("<none>"))),
        }
    }

    // Sections absent from the file already fell back to their defaults
    // during deserialization.
    fn merge_config(&mut self, file_config: HeronConfig) {
        self.config = file_config;
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let env_vars: HashMap<String, String> =
            env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["BINDING", "VALIDATION_STATUS"] => {
                self.config.binding.validation_status = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected status code"))?;
            }
            ["BINDING", "PRESERVE_SOURCES_ON_BODY_METHODS"] => {
                self.config.binding.preserve_sources_on_body_methods = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["BINDING", "MAX_BODY_BYTES"] => {
                self.config.binding.max_body_bytes = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }

            ["DOCS", "TITLE"] => {
                self.config.docs.title = value.to_string();
            }
            ["DOCS", "VERSION"] => {
                self.config.docs.version = value.to_string();
            }
            ["DOCS", "DESCRIPTION"] => {
                self.config.docs.description = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            ["DOCS", "OPENAPI_VERSION"] => {
                self.config.docs.openapi_version = value.to_string();
            }

            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = parse_format(value).ok_or_else(|| {
                    ConfigError::env_parse_error(key, "expected 'json', 'pretty' or 'compact'")
                })?;
            }

            // Unknown keys under the prefix are ignored
            _ => {}
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_format(value: &str) -> Option<LogFormat> {
    match value.to_lowercase().as_str() {
        "json" => Some(LogFormat::Json),
        "pretty" => Some(LogFormat::Pretty),
        "compact" => Some(LogFormat::Compact),
        _ => None,
    }
}
