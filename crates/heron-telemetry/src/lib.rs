//! Observability for Heron.
//!
//! - **Logging**: [`init_logging`] installs a `tracing-subscriber` registry
//!   with an env filter and JSON, pretty or compact output. The library
//!   crates only emit `tracing` events; nothing is printed until a
//!   subscriber is installed.
//! - **Metrics**: binding outcomes are reported through the `metrics`
//!   facade. Installing a recorder or exporter is up to the host
//!   application; without one the calls are no-ops.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `heron_bind_total` | Counter | `route`, `outcome` | Binding attempts |
//! | `heron_bind_duration_seconds` | Histogram | `route` | Time spent binding |
//! | `heron_validation_errors_total` | Counter | `route` | Field errors reported |
//! | `heron_routes_registered_total` | Counter | `method` | Routes registered at startup |
//!
//! # Example
//!
//! ```rust,ignore
//! use heron_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(route = "get_user", "bound request");
//! ```

#![doc(html_root_url = "https://docs.rs/heron-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogFormat};
pub use metrics::{describe_metrics, record_bind, record_route_registered, BindOutcome};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
