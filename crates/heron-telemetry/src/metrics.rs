//! Binding metrics.
//!
//! Recorded through the `metrics` facade; see the crate docs for the
//! metric table.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Binding attempts, by route and outcome.
pub const BIND_TOTAL: &str = "heron_bind_total";

/// Time spent binding, by route.
pub const BIND_DURATION_SECONDS: &str = "heron_bind_duration_seconds";

/// Individual field errors reported, by route.
pub const VALIDATION_ERRORS_TOTAL: &str = "heron_validation_errors_total";

/// Routes registered, by method.
pub const ROUTES_REGISTERED_TOTAL: &str = "heron_routes_registered_total";

/// How a binding attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// Arguments were produced.
    Bound,
    /// Validation failed.
    Invalid,
    /// The security requirement was not met.
    Unauthorized,
    /// The payload could not be read.
    Malformed,
}

impl BindOutcome {
    /// Label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bound => "bound",
            Self::Invalid => "invalid",
            Self::Unauthorized => "unauthorized",
            Self::Malformed => "malformed",
        }
    }
}

/// Registers descriptions for every Heron metric with the installed
/// recorder.
pub fn describe_metrics() {
    describe_counter!(BIND_TOTAL, "Request binding attempts by outcome");
    describe_histogram!(BIND_DURATION_SECONDS, "Time spent binding a request in seconds");
    describe_counter!(VALIDATION_ERRORS_TOTAL, "Field validation errors reported to clients");
    describe_counter!(ROUTES_REGISTERED_TOTAL, "Routes registered at startup");
}

/// Records one binding attempt.
///
/// `field_errors` is the number of validation errors reported, zero unless
/// the outcome is [`BindOutcome::Invalid`].
pub fn record_bind(route: &str, outcome: BindOutcome, field_errors: usize, duration: Duration) {
    counter!(BIND_TOTAL, "route" => route.to_string(), "outcome" => outcome.as_str())
        .increment(1);
    histogram!(BIND_DURATION_SECONDS, "route" => route.to_string())
        .record(duration.as_secs_f64());

    if field_errors > 0 {
        counter!(VALIDATION_ERRORS_TOTAL, "route" => route.to_string())
            .increment(field_errors as u64);
    }
}

/// Records a route registration.
pub fn record_route_registered(method: &str) {
    counter!(ROUTES_REGISTERED_TOTAL, "method" => method.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(BindOutcome::Bound.as_str(), "bound");
        assert_eq!(BindOutcome::Invalid.as_str(), "invalid");
        assert_eq!(BindOutcome::Unauthorized.as_str(), "unauthorized");
        assert_eq!(BindOutcome::Malformed.as_str(), "malformed");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        describe_metrics();
        record_bind("get_user", BindOutcome::Bound, 0, Duration::from_micros(40));
        record_bind("create_user", BindOutcome::Invalid, 2, Duration::from_micros(75));
        record_route_registered("GET");
    }
}
