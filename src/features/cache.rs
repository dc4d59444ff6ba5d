//! Published feature state: the snapshot/table pair.
//!
//! The poller is the only writer; request handlers read on every `/` hit.
//! Snapshot and table are bundled into one [`FeatureState`] and swapped as a
//! single `Arc`, so a reader can never observe a row count that does not
//! correspond to the table it sees.

use std::sync::Arc;
use std::time::SystemTime;

use arc_swap::ArcSwap;

use crate::features::table::FeatureTable;

/// The latest complete, successful poll result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSnapshot {
    /// Row count reported by the provider (length of the name list).
    pub row_count: usize,
    /// When this snapshot was published locally.
    pub refreshed_at: SystemTime,
}

/// Snapshot plus the table it was built from, published together.
#[derive(Debug, Clone)]
pub struct FeatureState {
    pub snapshot: FeatureSnapshot,
    pub table: FeatureTable,
}

/// Shared holder for the currently published [`FeatureState`].
///
/// Reads are lock-free; the single poller task publishes with one atomic
/// swap. Nothing is ever partially updated.
pub struct FeatureCache {
    state: ArcSwap<FeatureState>,
}

impl FeatureCache {
    /// Create a cache holding an empty state: zero rows, an empty table of
    /// the configured capacity, refreshed at process start.
    pub fn empty(capacity: usize) -> Self {
        Self {
            state: ArcSwap::from_pointee(FeatureState {
                snapshot: FeatureSnapshot {
                    row_count: 0,
                    refreshed_at: SystemTime::now(),
                },
                table: FeatureTable::with_capacity(capacity),
            }),
        }
    }

    /// Load the currently published state.
    pub fn load(&self) -> Arc<FeatureState> {
        self.state.load_full()
    }

    /// Row count of the currently published snapshot.
    pub fn row_count(&self) -> usize {
        self.state.load().snapshot.row_count
    }

    /// Publish a new state, replacing the previous one atomically.
    pub fn publish(&self, state: FeatureState) {
        self.state.store(Arc::new(state));
    }
}
