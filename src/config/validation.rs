//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::MonitorConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("backend.origin {origin:?} is not a valid http(s) url")]
    InvalidOrigin { origin: String },
    #[error("backend.health_path {path:?} must start with '/'")]
    InvalidHealthPath { path: String },
    #[error("observability.metrics_address {address:?} is not a socket address")]
    InvalidMetricsAddress { address: String },
    #[error("unknown log level {level:?}")]
    InvalidLogLevel { level: String },
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let non_zero = [
        ("connectivity.debounce_window_ms", config.connectivity.debounce_window_ms),
        ("connectivity.failure_threshold", config.connectivity.failure_threshold as u64),
        ("connectivity.recovery_interval_secs", config.connectivity.recovery_interval_secs),
        ("backend.probe_timeout_ms", config.backend.probe_timeout_ms),
        ("watch.poll_interval_secs", config.watch.poll_interval_secs),
        ("watch.connect_timeout_ms", config.watch.connect_timeout_ms),
    ];
    for (field, value) in non_zero {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    match Url::parse(&config.backend.origin) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::InvalidOrigin {
            origin: config.backend.origin.clone(),
        }),
    }

    if !config.backend.health_path.starts_with('/') {
        errors.push(ValidationError::InvalidHealthPath {
            path: config.backend.health_path.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress {
            address: config.observability.metrics_address.clone(),
        });
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::InvalidLogLevel {
            level: config.observability.log_level.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
