//! Configuration section types.

use http::StatusCode;
use serde::{Deserialize, Serialize};

use heron_binding::BindingOptions;
use heron_telemetry::{LogConfig, LogFormat};

use crate::ConfigError;

/// Request binding section.
///
/// # Example
///
/// ```
/// use heron_config::BindingConfig;
///
/// let config = BindingConfig::default();
/// let options = config.to_options().unwrap();
/// assert_eq!(options.validation_status.as_u16(), 422);
/// assert!(!options.preserve_sources_on_body_methods);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    /// Status code reported when validation fails.
    #[serde(default = "default_validation_status")]
    pub validation_status: u16,

    /// Keep path, query and header values when a body-carrying method
    /// binds form data, instead of replacing them.
    #[serde(default)]
    pub preserve_sources_on_body_methods: bool,

    /// Largest JSON payload the binder parses.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            validation_status: default_validation_status(),
            preserve_sources_on_body_methods: false,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl BindingConfig {
    /// Converts the section into binder options.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] if `validation_status` is not a 4xx code.
    pub fn to_options(&self) -> Result<BindingOptions, ConfigError> {
        let status = StatusCode::from_u16(self.validation_status)
            .ok()
            .filter(StatusCode::is_client_error)
            .ok_or_else(|| {
                ConfigError::invalid_value(
                    "binding.validation_status",
                    format!("{} is not a client error status", self.validation_status),
                )
            })?;

        Ok(BindingOptions {
            preserve_sources_on_body_methods: self.preserve_sources_on_body_methods,
            validation_status: status,
            max_body_bytes: self.max_body_bytes,
        })
    }
}

fn default_validation_status() -> u16 {
    422
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// OpenAPI document section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DocsConfig {
    /// API title.
    #[serde(default = "default_title")]
    pub title: String,

    /// API version.
    #[serde(default = "default_version")]
    pub version: String,

    /// Optional API description.
    #[serde(default)]
    pub description: Option<String>,

    /// Version of the OpenAPI format written out.
    #[serde(default = "default_openapi_version")]
    pub openapi_version: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: default_version(),
            description: None,
            openapi_version: default_openapi_version(),
        }
    }
}

fn default_title() -> String {
    "Heron API".to_string()
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_openapi_version() -> String {
    "3.1.0".to_string()
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Install a subscriber at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive, e.g. `info` or `heron_binding=trace,info`.
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_level(),
            format: LogFormat::Json,
        }
    }
}

impl LoggingConfig {
    /// Converts the section into a subscriber configuration.
    ///
    /// Human-readable formats also turn on span events and source locations.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty | LogFormat::Compact => LogConfig::development(),
        };
        LogConfig {
            enabled: self.enabled,
            filter: self.level.clone(),
            format: self.format,
            ..base
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
