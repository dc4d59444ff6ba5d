//! Request statistics.
//!
//! # Responsibilities
//! - Count total / per-method / per-path forwarded requests
//! - Count intercepted bot requests separately
//! - Produce a consistent point-in-time snapshot for `/stats`
//!
//! # Design Decisions
//! - One mutex over all counters: `snapshot()` must be a coherent copy, and
//!   every critical section is O(1) so handlers never queue up behind it
//! - Counters only grow for the process lifetime; there is no reset path

use std::collections::BTreeMap;
use std::sync::Mutex;

use axum::http::Method;
use serde::Serialize;

#[derive(Debug, Default)]
struct StatsInner {
    total: u64,
    by_method: BTreeMap<String, u64>,
    by_path: BTreeMap<String, u64>,
    bot_count: u64,
}

/// Immutable copy of the counters, shaped for the `/stats` payload.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub by_method: BTreeMap<String, u64>,
    pub by_path: BTreeMap<String, u64>,
    pub bot_requests: u64,
    pub human_requests: u64,
}

/// Shared counter registry, written by request handlers.
pub struct StatsCollector {
    inner: Mutex<StatsInner>,
    count_bot_in_total: bool,
}

impl StatsCollector {
    pub fn new(count_bot_in_total: bool) -> Self {
        Self {
            inner: Mutex::new(StatsInner::default()),
            count_bot_in_total,
        }
    }

    /// Record one forwarded request.
    pub fn record(&self, method: &Method, path: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.total += 1;
        *inner.by_method.entry(method.to_string()).or_insert(0) += 1;
        *inner.by_path.entry(path.to_string()).or_insert(0) += 1;
    }

    /// Record one intercepted bot request. Whether it also enters the totals
    /// is decided by `count_bot_in_total`; intercepted requests never reach
    /// the backend either way.
    pub fn record_bot(&self, method: &Method, path: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.bot_count += 1;
        if self.count_bot_in_total {
            inner.total += 1;
            *inner.by_method.entry(method.to_string()).or_insert(0) += 1;
            *inner.by_path.entry(path.to_string()).or_insert(0) += 1;
        }
    }

    /// A coherent copy of the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.lock().unwrap();
        StatsSnapshot {
            total: inner.total,
            by_method: inner.by_method.clone(),
            by_path: inner.by_path.clone(),
            bot_requests: inner.bot_count,
            human_requests: inner.total.saturating_sub(inner.bot_count),
        }
    }
}
