//! Municipality name → boundary resolution
//!
//! The gazetteer itself is an external service; this module only defines
//! the seam and a memoizing wrapper around it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::boundary::GeographicBoundary;
use super::errors::{GeoError, GeoResult};
use crate::observability::PlannerMetrics;

/// Resolves a municipality name to its boundary.
///
/// Implementations block the calling thread and own their timeouts.
pub trait Gazetteer: Send + Sync {
    fn resolve(&self, municipality: &str) -> GeoResult<GeographicBoundary>;
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Memoizes successful lookups of an inner gazetteer.
///
/// Keys are trimmed and lowercased. Failures are never cached, so a
/// transient outage does not stick.
pub struct CachedGazetteer {
    inner: Arc<dyn Gazetteer>,
    cache: RwLock<HashMap<String, GeographicBoundary>>,
    metrics: Option<Arc<PlannerMetrics>>,
}

impl CachedGazetteer {
    pub fn new(inner: Arc<dyn Gazetteer>) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            metrics: None,
        }
    }

    /// Count hits and misses in `metrics`
    pub fn with_metrics(mut self, metrics: Arc<PlannerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Number of cached boundaries
    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Gazetteer for CachedGazetteer {
    fn resolve(&self, municipality: &str) -> GeoResult<GeographicBoundary> {
        let key = normalize_name(municipality);

        // Inserts are single calls; a poisoned map is still consistent
        let cached = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .cloned();
        if let Some(boundary) = cached {
            if let Some(m) = &self.metrics {
                m.increment_gazetteer_cache_hits();
            }
            return Ok(boundary);
        }

        if let Some(m) = &self.metrics {
            m.increment_gazetteer_cache_misses();
        }
        let boundary = self.inner.resolve(municipality)?;
        self.cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, boundary.clone());
        Ok(boundary)
    }
}

/// Fixed in-memory gazetteer, for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct StaticGazetteer {
    boundaries: HashMap<String, GeographicBoundary>,
}

impl StaticGazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, municipality: &str, boundary: GeographicBoundary) -> Self {
        self.boundaries.insert(normalize_name(municipality), boundary);
        self
    }
}

impl Gazetteer for StaticGazetteer {
    fn resolve(&self, municipality: &str) -> GeoResult<GeographicBoundary> {
        self.boundaries
            .get(&normalize_name(municipality))
            .cloned()
            .ok_or_else(|| GeoError::municipality_not_found(municipality))
    }
}
