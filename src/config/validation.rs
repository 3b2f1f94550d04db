//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, bind addresses parseable)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RedirectorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::RedirectorConfig;

/// A single semantic problem in the configuration.
#[derive(Debug)]
pub struct ValidationError {
    field: &'static str,
    problem: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.problem)
    }
}

fn check_bind_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field,
            problem: format!("{value:?} is not a valid socket address"),
        });
    }
}

/// Validate a deserialized configuration, collecting every problem.
pub fn validate_config(config: &RedirectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_bind_address(
        &mut errors,
        "listener.bind_address",
        &config.listener.bind_address,
    );
    if config.admin.enabled {
        check_bind_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
    }
    if config.observability.metrics_enabled {
        check_bind_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.rules.file.trim().is_empty() {
        errors.push(ValidationError {
            field: "rules.file",
            problem: "must not be empty".to_string(),
        });
    }
    if config.rules.poll_interval_ms == 0 {
        errors.push(ValidationError {
            field: "rules.poll_interval_ms",
            problem: "must be greater than zero".to_string(),
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError {
            field: "timeouts.request_secs",
            problem: "must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
