//! Configuration loading from disk and environment.
//!
//! Precedence: environment variables override file values, which override
//! defaults. The file is optional; a fully env-driven deployment needs no
//! config file at all.

use std::env;
use std::fs;
use std::path::Path;

use crate::config::schema::{BotgateConfig, OverflowPolicy};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    /// An environment variable was set to an unparseable value.
    Env { var: &'static str, reason: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, reason } => write!(f, "Invalid {}: {}", var, reason),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: optional TOML file, then env overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<BotgateConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => BotgateConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply the environment-variable configuration surface on top of `config`.
pub fn apply_env_overrides(config: &mut BotgateConfig) -> Result<(), ConfigError> {
    if let Some(host) = read_var("BACKEND_HOST") {
        config.backend.host = host;
    }
    if let Some(port) = parse_var::<u16>("BACKEND_PORT")? {
        config.backend.port = port;
    }
    if let Some(port) = parse_var::<u16>("LISTEN_PORT")? {
        config.listener.bind_address = format!("0.0.0.0:{}", port);
    }
    if let Some(url) = read_var("FEATURES_URL") {
        config.features.url = url;
    }
    if let Some(secs) = parse_var::<u64>("POLL_INTERVAL_SECONDS")? {
        config.features.poll_interval_secs = secs;
    }
    if let Some(secs) = parse_var::<u64>("FEATURE_FETCH_TIMEOUT_SECONDS")? {
        config.features.fetch_timeout_secs = secs;
    }
    if let Some(capacity) = parse_var::<usize>("FEATURE_TABLE_CAPACITY")? {
        config.features.table_capacity = capacity;
    }
    if let Some(policy) = parse_var::<OverflowPolicy>("ON_POLL_OVERFLOW")? {
        config.features.on_overflow = policy;
    }
    if let Some(low) = parse_var::<usize>("BOT_THRESHOLD_LOW")? {
        config.bot_manager.threshold_low = low;
    }
    if let Some(high) = parse_var::<usize>("BOT_THRESHOLD_HIGH")? {
        config.bot_manager.threshold_high = high;
    }
    if let Some(enabled) = parse_bool_var("BOT_MANAGER_ENABLED")? {
        config.bot_manager.enabled = enabled;
    }
    if let Some(always) = parse_bool_var("ALWAYS_BOT")? {
        config.bot_manager.always_bot = always;
    }
    if let Some(count) = parse_bool_var("COUNT_BOT_IN_TOTAL")? {
        config.stats.count_bot_in_total = count;
    }
    if let Some(secs) = parse_var::<u64>("BACKEND_TIMEOUT_SECONDS")? {
        config.backend.timeout_secs = secs;
    }
    Ok(())
}

fn read_var(var: &'static str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match read_var(var) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Env {
                var,
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Booleans accept the usual spellings: true/false, 1/0, yes/no, on/off.
fn parse_bool_var(var: &'static str) -> Result<Option<bool>, ConfigError> {
    match read_var(var) {
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            other => Err(ConfigError::Env {
                var,
                reason: format!("expected a boolean, got {other:?}"),
            }),
        },
        None => Ok(None),
    }
}
