//! Fixed-capacity feature name registry.
//!
//! # Responsibilities
//! - Hold the feature names from the last clean poll cycle
//! - Enforce the capacity chosen at startup
//! - Surface overflow as a typed fault, never a silent truncation
//!
//! # Design Decisions
//! - Slot count is fixed at construction and never grows
//! - Duplicate names within one cycle are logged and kept; the upstream
//!   provider owns dedup, the proxy only observes

use std::collections::HashSet;
use thiserror::Error;

/// A poll cycle offered more names than the table can hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("feature table overflow: {offered} names offered, capacity {capacity}")]
pub struct FeatureTableOverflow {
    pub capacity: usize,
    pub offered: usize,
}

/// Fixed-size registry of feature names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureTable {
    /// Exactly `capacity` slots; unoccupied slots stay `None`.
    slots: Vec<Option<String>>,
}

impl FeatureTable {
    /// Create an empty table with the given fixed capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Build a candidate table from one cycle's ordered name list.
    ///
    /// Every name, duplicate or not, occupies the next slot; a name landing
    /// at an index past the last slot is an overflow fault and the candidate
    /// is discarded whole.
    pub fn from_names<S: AsRef<str>>(
        capacity: usize,
        names: &[S],
    ) -> Result<Self, FeatureTableOverflow> {
        let mut table = Self::with_capacity(capacity);
        let mut seen: HashSet<&str> = HashSet::new();

        for (i, name) in names.iter().enumerate() {
            let name = name.as_ref();
            if !seen.insert(name) {
                tracing::warn!(name = %name, "duplicate feature name detected");
            }
            if i >= capacity {
                return Err(FeatureTableOverflow {
                    capacity,
                    offered: names.len(),
                });
            }
            table.slots[i] = Some(name.to_string());
        }

        Ok(table)
    }

    /// The fixed slot count.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    /// Occupied names in slot order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().filter_map(|s| s.as_deref())
    }
}
