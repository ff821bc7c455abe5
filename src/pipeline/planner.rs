//! Request pipeline
//!
//! ```text
//! candidate plan ──┬──────────────────────────────┐
//!                  │                              ▼
//! municipality ──► gazetteer ──► containment ──► validate/enrich ──► synthesize ──► SQL
//! free text ─────► retrieval (advisory context for intent extraction only)
//! ```
//!
//! Each request runs sequentially on the caller's thread. Cancellation is
//! checked before each stage; a cancelled request returns no partial plan.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cancel::CancelToken;
use crate::catalog::LayerCatalog;
use crate::config::GeoplanConfig;
use crate::error::{GeoplanError, GeoplanResult};
use crate::geo::{build_containment_clause, GeoError, Gazetteer, GeographicBoundary, TargetSrid};
use crate::observability::{log_event_with_fields, Event, ObservationScope, PlannerMetrics};
use crate::plan::{CandidatePlan, EnrichedPlan, EnrichmentDefaults, PlanValidator};
use crate::retrieval::{
    format_layer_context, EmbeddingProvider, LayerRetrievalIndex, RetrievalError, ScoredLayer,
};
use crate::sql::{synthesize, SqlOptions};

/// One planning request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub plan: CandidatePlan,
    /// Municipality the result must lie in, resolved through the gazetteer
    #[serde(default)]
    pub municipality: Option<String>,
}

impl PlanRequest {
    pub fn new(plan: CandidatePlan) -> Self {
        Self {
            plan,
            municipality: None,
        }
    }

    pub fn in_municipality(mut self, municipality: impl Into<String>) -> Self {
        self.municipality = Some(municipality.into());
        self
    }
}

/// A synthesized statement and the plan it was rendered from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOutcome {
    pub request_id: Uuid,
    pub plan: EnrichedPlan,
    pub sql: String,
}

/// Shared, read-only planning service.
///
/// Holds the catalog and collaborators; cheap to share behind an `Arc`.
pub struct Planner {
    catalog: Arc<LayerCatalog>,
    retrieval: Option<LayerRetrievalIndex>,
    gazetteer: Option<Arc<dyn Gazetteer>>,
    defaults: EnrichmentDefaults,
    sql_options: SqlOptions,
    target_srid: TargetSrid,
    retrieval_k: usize,
    retrieval_min_score: Option<f64>,
    metrics: Arc<PlannerMetrics>,
}

impl Planner {
    pub fn new(catalog: Arc<LayerCatalog>, config: &GeoplanConfig) -> Self {
        Self {
            catalog,
            retrieval: None,
            gazetteer: None,
            defaults: config.enrichment_defaults(),
            sql_options: config.sql_options(),
            target_srid: config.target_srid(),
            retrieval_k: config.retrieval_k,
            retrieval_min_score: config.retrieval_min_score,
            metrics: Arc::new(PlannerMetrics::new()),
        }
    }

    pub fn with_embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.retrieval = Some(
            LayerRetrievalIndex::new(Arc::clone(&self.catalog), provider)
                .with_min_score(self.retrieval_min_score),
        );
        self
    }

    pub fn with_gazetteer(mut self, gazetteer: Arc<dyn Gazetteer>) -> Self {
        self.gazetteer = Some(gazetteer);
        self
    }

    /// Share counters with other components (e.g. a `CachedGazetteer`)
    pub fn with_metrics(mut self, metrics: Arc<PlannerMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn catalog(&self) -> &LayerCatalog {
        &self.catalog
    }

    pub fn metrics(&self) -> &PlannerMetrics {
        &self.metrics
    }

    /// Top layers for `text`, using the configured `k`
    pub fn retrieve(&self, text: &str) -> GeoplanResult<Vec<ScoredLayer>> {
        let index = self.retrieval.as_ref().ok_or_else(|| {
            GeoplanError::from(RetrievalError::unavailable("no embedding provider configured"))
        })?;

        self.metrics.increment_retrievals();
        match index.retrieve_top_layers(text, self.retrieval_k) {
            Ok(top) => {
                let count = top.len().to_string();
                log_event_with_fields(Event::RetrievalComplete, &[("results", count.as_str())]);
                Ok(top)
            }
            Err(e) => {
                self.metrics.increment_retrieval_failures();
                log_event_with_fields(
                    Event::RetrievalDegraded,
                    &[("code", e.code().code()), ("reason", e.message())],
                );
                Err(e.into())
            }
        }
    }

    /// Retrieval context for intent extraction.
    ///
    /// On `GEOPLAN_RETRIEVAL_UNAVAILABLE` the caller decides whether to
    /// continue without context.
    pub fn context_for(&self, text: &str) -> GeoplanResult<String> {
        Ok(format_layer_context(&self.retrieve(text)?))
    }

    /// Validates, enriches and synthesizes one request.
    pub fn plan(&self, request: &PlanRequest, cancel: &CancelToken) -> GeoplanResult<PlanOutcome> {
        self.run(cancel, |planner| {
            check_cancelled(cancel, "boundary resolution")?;
            let boundary = match request.municipality.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => Some(planner.resolve_boundary(name)?),
                _ => None,
            };
            planner.enrich_and_synthesize(&request.plan, boundary.as_ref(), cancel)
        })
    }

    /// Like `plan`, with a boundary the caller already resolved
    pub fn plan_with_boundary(
        &self,
        plan: &CandidatePlan,
        boundary: Option<&GeographicBoundary>,
        cancel: &CancelToken,
    ) -> GeoplanResult<PlanOutcome> {
        self.run(cancel, |planner| planner.enrich_and_synthesize(plan, boundary, cancel))
    }

    /// Validation and enrichment only, no SQL
    pub fn enrich(
        &self,
        plan: &CandidatePlan,
        boundary: Option<&GeographicBoundary>,
    ) -> GeoplanResult<EnrichedPlan> {
        let containment = match boundary {
            Some(b) => Some(self.containment_clause(b)?),
            None => None,
        };
        let enriched = PlanValidator::new(&self.catalog, &self.defaults)
            .validate_and_enrich(plan, containment.as_deref())?;
        log_event_with_fields(
            Event::PlanEnriched,
            &[
                ("layer", enriched.layer.as_str()),
                ("operation", enriched.operation.as_str()),
            ],
        );
        Ok(enriched)
    }

    fn run<F>(&self, cancel: &CancelToken, stages: F) -> GeoplanResult<PlanOutcome>
    where
        F: FnOnce(&Self) -> GeoplanResult<(EnrichedPlan, String)>,
    {
        let request_id = Uuid::new_v4();
        let id = request_id.to_string();
        let scope = ObservationScope::with_fields("PLAN_REQUEST", &[("request_id", id.as_str())]);

        let result = check_cancelled(cancel, "start").and_then(|_| stages(self));
        match result {
            Ok((plan, sql)) => {
                self.metrics.increment_plans_synthesized();
                log_event_with_fields(
                    Event::PlanSynthesized,
                    &[
                        ("operation", plan.operation.as_str()),
                        ("request_id", id.as_str()),
                    ],
                );
                scope.complete_with_fields(&[("operation", plan.operation.as_str())]);
                Ok(PlanOutcome {
                    request_id,
                    plan,
                    sql,
                })
            }
            Err(e) => {
                let event = if matches!(e, GeoplanError::Cancelled { .. }) {
                    self.metrics.increment_plans_cancelled();
                    Event::PlanCancelled
                } else {
                    self.metrics.increment_plans_rejected();
                    Event::PlanRejected
                };
                let message = e.message();
                log_event_with_fields(
                    event,
                    &[
                        ("code", e.code()),
                        ("reason", message.as_str()),
                        ("request_id", id.as_str()),
                    ],
                );
                scope.fail(e.code(), &message);
                Err(e)
            }
        }
    }

    fn enrich_and_synthesize(
        &self,
        plan: &CandidatePlan,
        boundary: Option<&GeographicBoundary>,
        cancel: &CancelToken,
    ) -> GeoplanResult<(EnrichedPlan, String)> {
        check_cancelled(cancel, "enrichment")?;
        let enriched = self.enrich(plan, boundary)?;

        check_cancelled(cancel, "synthesis")?;
        let sql = synthesize(&enriched, &self.sql_options)?;
        Ok((enriched, sql))
    }

    fn resolve_boundary(&self, municipality: &str) -> GeoplanResult<GeographicBoundary> {
        let gazetteer = self.gazetteer.as_ref().ok_or_else(|| {
            GeoError::gazetteer_unavailable(format!(
                "no gazetteer configured to resolve '{}'",
                municipality
            ))
        })?;
        let boundary = gazetteer.resolve(municipality)?;
        log_event_with_fields(Event::BoundaryResolved, &[("municipality", municipality)]);
        Ok(boundary)
    }

    fn containment_clause(&self, boundary: &GeographicBoundary) -> GeoplanResult<String> {
        let geometry = self.sql_options.primary_geometry();
        Ok(build_containment_clause(boundary, self.target_srid, &geometry)?)
    }
}

fn check_cancelled(cancel: &CancelToken, stage: &'static str) -> GeoplanResult<()> {
    if cancel.is_cancelled() {
        Err(GeoplanError::Cancelled { stage })
    } else {
        Ok(())
    }
}
