//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, per-connection tasks)
//!     → request.rs (stamp request ID)
//!     → front door dispatch (stats | classify | passthrough)
//!     → proxy::forwarder (backend relay) or synthetic reply
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
