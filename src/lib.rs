//! botgate: a bot-gating reverse proxy.
//!
//! Sits in front of a single customer backend and, per inbound request,
//! either forwards it unmodified or intercepts it with a synthetic response.
//! The decision is driven by a feature snapshot refreshed by a background
//! poller from an upstream provider.

pub mod classifier;
pub mod config;
pub mod features;
pub mod http;
pub mod lifecycle;
pub mod proxy;
pub mod stats;

pub use config::BotgateConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
