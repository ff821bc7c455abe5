//! Observable events for geoplan
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Startup
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Layer index loaded from disk
    CatalogLoaded,
    /// Layer index written to disk
    CatalogWritten,

    // Retrieval
    /// Top-k retrieval complete
    RetrievalComplete,
    /// Embedding provider unavailable; caller proceeds without context
    RetrievalDegraded,

    // Gazetteer
    /// Municipality resolved to a boundary
    BoundaryResolved,

    // Planning
    /// Candidate plan enriched
    PlanEnriched,
    /// Candidate plan rejected
    PlanRejected,
    /// SQL synthesized
    PlanSynthesized,
    /// Request cancelled between stages
    PlanCancelled,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CatalogLoaded => "LAYER_INDEX_LOADED",
            Event::CatalogWritten => "LAYER_INDEX_WRITTEN",
            Event::RetrievalComplete => "RETRIEVAL_COMPLETE",
            Event::RetrievalDegraded => "RETRIEVAL_DEGRADED",
            Event::BoundaryResolved => "BOUNDARY_RESOLVED",
            Event::PlanEnriched => "PLAN_ENRICHED",
            Event::PlanRejected => "PLAN_REJECTED",
            Event::PlanSynthesized => "PLAN_SYNTHESIZED",
            Event::PlanCancelled => "PLAN_CANCELLED",
        }
    }

    /// Returns true if the event signals a degraded or failed request
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::RetrievalDegraded | Event::PlanRejected | Event::PlanCancelled
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
