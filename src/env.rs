//! Environment variable names used by this crate for convenient
//! configuration of interceptors from services.
//!
//! These are purely helpers; the core types remain decoupled from
//! environment access.

use crate::backend::{make_sink, BackendBuildError};
use crate::interceptor::{FailurePolicy, Interceptor, InterceptorConfig};

/// Sink DSN, see [`crate::backend::parse_dsn`]. Defaults to `tracing`.
pub const CALL_LOG_SINK_ENV: &str = "CALL_LOG_SINK";

/// Optional logical service name attached to every record.
pub const CALL_LOG_SERVICE_NAME_ENV: &str = "CALL_LOG_SERVICE_NAME";

/// Username recorded for calls without an identity.
pub const CALL_LOG_ANONYMOUS_USER_ENV: &str = "CALL_LOG_ANONYMOUS_USER";

/// Address recorded when the origin of a call is unknown.
pub const CALL_LOG_ADDRESS_PLACEHOLDER_ENV: &str = "CALL_LOG_ADDRESS_PLACEHOLDER";

/// `true`/`1`/`yes`/`on` to also record failed calls.
pub const CALL_LOG_LOG_FAILURES_ENV: &str = "CALL_LOG_LOG_FAILURES";

pub const DEFAULT_SINK_DSN: &str = "tracing";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl InterceptorConfig {
    /// Build a config from `CALL_LOG_*` variables, using the defaults for
    /// anything unset.
    pub fn from_env() -> Self {
        let defaults = InterceptorConfig::default();
        let failure_policy = match env_opt(CALL_LOG_LOG_FAILURES_ENV) {
            Some(v) if parse_flag(&v) => FailurePolicy::Record,
            _ => FailurePolicy::Skip,
        };

        InterceptorConfig {
            anonymous_user: env_opt(CALL_LOG_ANONYMOUS_USER_ENV).unwrap_or(defaults.anonymous_user),
            source_address_placeholder: env_opt(CALL_LOG_ADDRESS_PLACEHOLDER_ENV)
                .unwrap_or(defaults.source_address_placeholder),
            service_name: env_opt(CALL_LOG_SERVICE_NAME_ENV),
            failure_policy,
        }
    }
}

impl Interceptor {
    /// Build the sink from [`CALL_LOG_SINK_ENV`] and the config from the
    /// other `CALL_LOG_*` variables.
    pub fn from_env() -> Result<Self, BackendBuildError> {
        let sink = make_sink(&env_or(CALL_LOG_SINK_ENV, DEFAULT_SINK_DSN))?;
        Ok(Interceptor::with_config(sink, InterceptorConfig::from_env()))
    }
}
