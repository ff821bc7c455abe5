//! Counters for the planning pipeline
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Thread-safe without locks

use std::sync::atomic::{AtomicU64, Ordering};

/// Operational counters shared by all requests of one planner.
///
/// All counters use Relaxed ordering; they are never used for
/// synchronization.
#[derive(Debug, Default)]
pub struct PlannerMetrics {
    plans_synthesized: AtomicU64,
    plans_rejected: AtomicU64,
    plans_cancelled: AtomicU64,
    retrievals: AtomicU64,
    retrieval_failures: AtomicU64,
    gazetteer_cache_hits: AtomicU64,
    gazetteer_cache_misses: AtomicU64,
}

impl PlannerMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_plans_synthesized(&self) {
        self.plans_synthesized.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_plans_rejected(&self) {
        self.plans_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_plans_cancelled(&self) {
        self.plans_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_retrievals(&self) {
        self.retrievals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_retrieval_failures(&self) {
        self.retrieval_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_gazetteer_cache_hits(&self) {
        self.gazetteer_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_gazetteer_cache_misses(&self) {
        self.gazetteer_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all counters as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            plans_synthesized: self.plans_synthesized.load(Ordering::Relaxed),
            plans_rejected: self.plans_rejected.load(Ordering::Relaxed),
            plans_cancelled: self.plans_cancelled.load(Ordering::Relaxed),
            retrievals: self.retrievals.load(Ordering::Relaxed),
            retrieval_failures: self.retrieval_failures.load(Ordering::Relaxed),
            gazetteer_cache_hits: self.gazetteer_cache_hits.load(Ordering::Relaxed),
            gazetteer_cache_misses: self.gazetteer_cache_misses.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub plans_synthesized: u64,
    pub plans_rejected: u64,
    pub plans_cancelled: u64,
    pub retrievals: u64,
    pub retrieval_failures: u64,
    pub gazetteer_cache_hits: u64,
    pub gazetteer_cache_misses: u64,
}
