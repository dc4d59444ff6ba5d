//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the bot-gating proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BotgateConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// The single backend this proxy fronts.
    pub backend: BackendConfig,

    /// Feature poller settings.
    pub features: FeaturePollConfig,

    /// Bot-management settings.
    pub bot_manager: BotManagerConfig,

    /// Stats collection settings.
    pub stats: StatsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:50001").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:50001".to_string(),
        }
    }
}

/// Backend server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend host name or address.
    pub host: String,

    /// Backend port.
    pub port: u16,

    /// Total timeout for one forwarded request in seconds.
    pub timeout_secs: u64,
}

impl BackendConfig {
    /// The authority string (`host:port`) written into the `Host` header of
    /// forwarded requests.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8081,
            timeout_secs: 10,
        }
    }
}

/// Feature poller configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeaturePollConfig {
    /// URL of the upstream feature provider.
    pub url: String,

    /// Sleep between poll cycles in seconds. Additive after each cycle
    /// completes; a slow cycle delays the next by its own duration.
    pub poll_interval_secs: u64,

    /// Timeout for one feature fetch in seconds.
    pub fetch_timeout_secs: u64,

    /// Fixed capacity of the feature table. Never changes after startup.
    pub table_capacity: usize,

    /// What to do when a poll cycle offers more names than the table holds.
    pub on_overflow: OverflowPolicy,
}

impl Default for FeaturePollConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8082/bot_features".to_string(),
            poll_interval_secs: 15,
            fetch_timeout_secs: 8,
            table_capacity: 4,
            on_overflow: OverflowPolicy::Retry,
        }
    }
}

/// Policy applied when a poll cycle overflows the feature table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Drop the cycle's update, keep the published state, continue polling.
    Retry,
    /// Signal a fatal fault; the process exits non-zero.
    Crash,
}

impl std::str::FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "retry" => Ok(OverflowPolicy::Retry),
            "crash" => Ok(OverflowPolicy::Crash),
            other => Err(format!("unknown overflow policy: {other:?} (expected retry|crash)")),
        }
    }
}

/// Bot-management configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BotManagerConfig {
    /// Master switch. When off, `/` is always forwarded and the classifier
    /// never runs.
    pub enabled: bool,

    /// Lower threshold: HUMAN requires `threshold_low < row_count`.
    pub threshold_low: usize,

    /// Upper threshold: HUMAN requires `row_count < threshold_high`.
    pub threshold_high: usize,

    /// Force BOT regardless of the feature signal. Some deployments bypass
    /// the signal entirely; this is the explicit switch for that mode.
    pub always_bot: bool,
}

impl Default for BotManagerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold_low: 2,
            threshold_high: 6,
            always_bot: false,
        }
    }
}

/// Stats collection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Whether intercepted BOT requests (which never reach the backend) are
    /// also counted in `total`/`by_method`/`by_path`.
    pub count_bot_in_total: bool,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            count_bot_in_total: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
