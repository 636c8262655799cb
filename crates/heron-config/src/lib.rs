//! Typed configuration for Heron.
//!
//! Supports:
//! - TOML and JSON files
//! - Environment variable overrides
//! - Strict parsing (unknown fields are rejected)
//! - Layering: defaults, then file, then environment
//!
//! # Example
//!
//! ```no_run
//! use heron_config::ConfigLoader;
//!
//! # fn main() -> Result<(), heron_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("heron.toml")?
//!     .with_env_prefix("HERON")
//!     .load()?;
//!
//! let options = config.binding.to_options()?;
//! heron_telemetry::init_logging(&config.logging.to_log_config()).ok();
//! # let _ = options;
//! # Ok(())
//! # }
//! ```
//!
//! # File format
//!
//! ```toml
//! [binding]
//! validation_status = 422
//! preserve_sources_on_body_methods = false
//! max_body_bytes = 1048576
//!
//! [docs]
//! title = "Inventory API"
//! version = "1.2.0"
//! description = "Stock and orders"
//! openapi_version = "3.1.0"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment overrides
//!
//! Keys follow `PREFIX__SECTION__KEY`:
//!
//! - `HERON__BINDING__VALIDATION_STATUS=400`
//! - `HERON__DOCS__TITLE=Inventory`
//! - `HERON__LOGGING__FORMAT=pretty`

mod config;
mod error;
mod loader;
mod schema;

pub use config::HeronConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{BindingConfig, DocsConfig, LoggingConfig};
