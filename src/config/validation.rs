//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacity > 0, timeouts > 0, thresholds ordered)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: BotgateConfig -> Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::BotgateConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every failure.
pub fn validate_config(config: &BotgateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("not a socket address: {:?}", config.listener.bind_address),
        });
    }

    if config.backend.host.is_empty() {
        errors.push(ValidationError {
            field: "backend.host",
            message: "must not be empty".to_string(),
        });
    }

    if config.backend.timeout_secs == 0 {
        errors.push(ValidationError {
            field: "backend.timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.features.url.parse::<axum::http::Uri>().is_err() {
        errors.push(ValidationError {
            field: "features.url",
            message: format!("not a valid URL: {:?}", config.features.url),
        });
    }

    if config.features.table_capacity == 0 {
        errors.push(ValidationError {
            field: "features.table_capacity",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.features.poll_interval_secs == 0 {
        errors.push(ValidationError {
            field: "features.poll_interval_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.features.fetch_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "features.fetch_timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.bot_manager.threshold_low >= config.bot_manager.threshold_high {
        errors.push(ValidationError {
            field: "bot_manager.threshold_low",
            message: format!(
                "must be below threshold_high ({} >= {})",
                config.bot_manager.threshold_low, config.bot_manager.threshold_high
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
