//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment-variable overrides)
//!     → validation.rs (semantic checks)
//!     → BotgateConfig (validated, immutable)
//!     → shared by value / via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults so an empty file or bare env is enough
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BackendConfig, BotManagerConfig, BotgateConfig, FeaturePollConfig, ListenerConfig,
    ObservabilityConfig, OverflowPolicy, StatsConfig,
};
