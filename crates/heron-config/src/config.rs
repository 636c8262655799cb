//! Root configuration type.

use serde::{Deserialize, Serialize};

use heron_telemetry::LogFormat;

use crate::{BindingConfig, ConfigError, DocsConfig, LoggingConfig};

/// Complete Heron configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to layer files and environment
/// variables over the defaults.
///
/// # Example
///
/// ```
/// use heron_config::HeronConfig;
///
/// let config = HeronConfig::default();
/// assert_eq!(config.binding.validation_status, 422);
/// assert_eq!(config.docs.openapi_version, "3.1.0");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HeronConfig {
    /// Request binding.
    #[serde(default)]
    pub binding: BindingConfig,

    /// OpenAPI document metadata.
    #[serde(default)]
    pub docs: DocsConfig,

    /// Structured logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HeronConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if:
    /// - `binding.validation_status` is not a 4xx code
    /// - `binding.max_body_bytes` is zero
    /// - `docs.title` or `docs.version` is blank
    /// - `docs.openapi_version` is not a 3.x version
    /// - `logging.level` is blank while logging is enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.binding.to_options()?;

        if self.binding.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "binding.max_body_bytes",
                "must be greater than zero",
            ));
        }

        if self.docs.title.trim().is_empty() {
            return Err(ConfigError::invalid_value("docs.title", "must not be empty"));
        }

        if self.docs.version.trim().is_empty() {
            return Err(ConfigError::invalid_value("docs.version", "must not be empty"));
        }

        if !self.docs.openapi_version.starts_with("3.") {
            return Err(ConfigError::invalid_value(
                "docs.openapi_version",
                format!("unsupported OpenAPI version: {}", self.docs.openapi_version),
            ));
        }

        if self.logging.enabled && self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                "must not be empty when logging is enabled",
            ));
        }

        Ok(())
    }

    /// Development preset: pretty debug logs, form merging kept on.
    #[must_use]
    pub fn development() -> Self {
        Self {
            binding: BindingConfig {
                preserve_sources_on_body_methods: true,
                ..BindingConfig::default()
            },
            docs: DocsConfig::default(),
            logging: LoggingConfig {
                enabled: true,
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
        }
    }

    /// Production preset: JSON logs at info.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }
}
