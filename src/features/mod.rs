//! Feature signal subsystem.
//!
//! # Data Flow
//! ```text
//! upstream provider (GET {features_url})
//!     → poller.rs (fetch, parse, validate)
//!     → table.rs (candidate table under the capacity invariant)
//!     → cache.rs (atomic publish of the snapshot/table pair)
//!     → read by the classifier on every `/` request
//! ```
//!
//! The poller task is the only writer. Request handlers never block on it
//! beyond the lock-free load of the current state.

pub mod cache;
pub mod poller;
pub mod table;

pub use cache::{FeatureCache, FeatureSnapshot, FeatureState};
pub use poller::{FeaturePoller, PollError};
pub use table::{FeatureTable, FeatureTableOverflow};
