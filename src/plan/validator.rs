//! Plan validation and enrichment
//!
//! Validation is eager and terminal: the first failing check rejects the
//! plan and nothing is defaulted in a way that changes its meaning.
//! Validation is deterministic and never touches the database.

use super::errors::{PlanError, PlanResult};
use super::filter::{is_layer_identifier, render_filters};
use super::types::{CandidatePlan, EnrichedPlan, Operation};
use crate::catalog::LayerCatalog;

/// Values applied to fields the candidate plan left out
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentDefaults {
    pub limit: u64,
    pub buffer_meters: f64,
    pub output_srid: i64,
    /// How many valid layers an `UnknownLayer` message lists
    pub unknown_layer_sample: usize,
    /// Also require target layers to exist in the catalog
    pub strict_target_layers: bool,
    /// Alias structured filters are qualified with
    pub primary_alias: String,
}

impl Default for EnrichmentDefaults {
    fn default() -> Self {
        Self {
            limit: 200,
            buffer_meters: 100.0,
            output_srid: 4326,
            unknown_layer_sample: 5,
            strict_target_layers: false,
            primary_alias: "a".to_string(),
        }
    }
}

/// Validates candidate plans against a catalog.
pub struct PlanValidator<'a> {
    catalog: &'a LayerCatalog,
    defaults: &'a EnrichmentDefaults,
}

impl<'a> PlanValidator<'a> {
    pub fn new(catalog: &'a LayerCatalog, defaults: &'a EnrichmentDefaults) -> Self {
        Self { catalog, defaults }
    }

    /// Validates `candidate` and returns it with every default applied.
    ///
    /// `containment` is an already built boundary predicate, AND-ed into
    /// the final `where_clause`.
    ///
    /// # Errors
    ///
    /// The first of, in this order: `UnsupportedOperation`, `UnknownLayer`,
    /// `MissingTargetLayer` or `UnknownLayer` (target not a table reference),
    /// `MissingTargetLayers` or `UnknownLayer` (same), `InvalidBufferDistance`,
    /// `InvalidLimit`, `InvalidOutputSrid`, `UnknownLayer` (strict targets),
    /// `InvalidFilter`.
    pub fn validate_and_enrich(
        &self,
        candidate: &CandidatePlan,
        containment: Option<&str>,
    ) -> PlanResult<EnrichedPlan> {
        // 1. Operation must be one of the closed set
        let operation: Operation = candidate
            .operation
            .parse()
            .map_err(|op: String| PlanError::unsupported_operation(&op, &Operation::names()))?;

        // 2. Primary layer must be present and known
        let layer = non_blank(candidate.layer.as_deref())
            .filter(|l| self.catalog.contains(l))
            .ok_or_else(|| {
                PlanError::unknown_layer(
                    "layer",
                    candidate.layer.as_deref(),
                    &self.catalog.sample(self.defaults.unknown_layer_sample),
                )
            })?
            .to_string();

        // 3. Single-target joins need a target_layer naming a table
        let target_layer = if operation.requires_target_layer() {
            let target = non_blank(candidate.target_layer.as_deref())
                .ok_or_else(|| PlanError::missing_target_layer(operation.as_str()))?;
            if !is_layer_identifier(target) {
                return Err(PlanError::invalid_layer_identifier("target_layer", target));
            }
            Some(target.to_string())
        } else {
            None
        };

        // 4. Multi-target buffer needs a non-empty list of table names
        let target_layers = if operation.requires_target_layers() {
            Some(self.check_target_layers(candidate.target_layers.as_deref())?)
        } else {
            None
        };

        // 5. Buffer distance, buffer-class operations only
        let buffer_meters = if operation.is_buffer_class() {
            let meters = candidate.buffer_meters.unwrap_or(self.defaults.buffer_meters);
            if !meters.is_finite() || meters < 0.0 {
                return Err(PlanError::invalid_buffer_distance(meters.to_string()));
            }
            Some(meters)
        } else {
            None
        };

        // 6. Limit
        let limit = match &candidate.limit {
            None => self.defaults.limit,
            Some(n) => limit_from_number(n).ok_or_else(|| PlanError::invalid_limit(n.to_string()))?,
        };

        // 7. Output SRID
        let output_srid = candidate.output_srid.unwrap_or(self.defaults.output_srid);
        if output_srid <= 0 {
            return Err(PlanError::invalid_output_srid(output_srid));
        }

        // 8. Optional catalog check of targets
        if self.defaults.strict_target_layers {
            self.check_targets_known(target_layer.as_deref(), target_layers.as_deref())?;
        }

        // 9. Combine author clause, structured filters and containment
        let filters = render_filters(
            candidate.filters.as_deref().unwrap_or_default(),
            &self.defaults.primary_alias,
        )?;
        let existing = combine(candidate.where_clause.as_deref(), filters.as_deref());
        let where_clause = combine_where_clauses(existing.as_deref(), containment);

        Ok(EnrichedPlan {
            operation,
            layer,
            target_layer,
            target_layers,
            where_clause,
            buffer_meters,
            limit: Some(limit),
            output_srid,
        })
    }

    fn check_target_layers(&self, layers: Option<&[String]>) -> PlanResult<Vec<String>> {
        let layers = match layers {
            Some(l) if !l.is_empty() => l,
            _ => return Err(PlanError::missing_target_layers("target_layers", None)),
        };
        layers
            .iter()
            .enumerate()
            .map(|(i, l)| {
                let field = format!("target_layers[{}]", i);
                match non_blank(Some(l.as_str())) {
                    None => Err(PlanError::missing_target_layers(field, Some(l.clone()))),
                    Some(name) if !is_layer_identifier(name) => {
                        Err(PlanError::invalid_layer_identifier(field, name))
                    }
                    Some(name) => Ok(name.to_string()),
                }
            })
            .collect()
    }

    fn check_targets_known(
        &self,
        target_layer: Option<&str>,
        target_layers: Option<&[String]>,
    ) -> PlanResult<()> {
        let sample = || self.catalog.sample(self.defaults.unknown_layer_sample);
        if let Some(target) = target_layer {
            if !self.catalog.contains(target) {
                return Err(PlanError::unknown_layer("target_layer", Some(target), &sample()));
            }
        }
        for (i, target) in target_layers.unwrap_or_default().iter().enumerate() {
            if !self.catalog.contains(target) {
                return Err(PlanError::unknown_layer(
                    format!("target_layers[{}]", i),
                    Some(target.as_str()),
                    &sample(),
                ));
            }
        }
        Ok(())
    }
}

/// Validates with default settings
pub fn validate_and_enrich(
    candidate: &CandidatePlan,
    catalog: &LayerCatalog,
    containment: Option<&str>,
) -> PlanResult<EnrichedPlan> {
    PlanValidator::new(catalog, &EnrichmentDefaults::default())
        .validate_and_enrich(candidate, containment)
}

/// `(existing) AND (containment)` when both are non-empty, otherwise
/// whichever is, otherwise `TRUE`.
pub fn combine_where_clauses(existing: Option<&str>, containment: Option<&str>) -> String {
    combine(existing, containment).unwrap_or_else(|| "TRUE".to_string())
}

fn combine(left: Option<&str>, right: Option<&str>) -> Option<String> {
    match (non_blank(left), non_blank(right)) {
        (Some(l), Some(r)) => Some(format!("({}) AND ({})", l, r)),
        (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
        (None, None) => None,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Integral, non-negative JSON numbers; `200.0` is accepted as 200
fn limit_from_number(n: &serde_json::Number) -> Option<u64> {
    if let Some(v) = n.as_u64() {
        return Some(v);
    }
    let f = n.as_f64()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{FilterExpr, PlanErrorCode};
    use serde_json::json;

    fn catalog() -> LayerCatalog {
        LayerCatalog::from_descriptions(
            [
                ("public.buildings", "GIS layer named buildings"),
                ("public.flomsoner", "GIS layer named flomsoner"),
                ("public.rivers", "GIS layer named rivers"),
                ("public.roads", "GIS layer named roads"),
                ("public.lakes", "GIS layer named lakes"),
                ("public.forest", "GIS layer named forest"),
            ],
            "public",
        )
        .unwrap()
    }

    fn enrich(plan: &CandidatePlan) -> PlanResult<EnrichedPlan> {
        validate_and_enrich(plan, &catalog(), None)
    }

    fn code(plan: &CandidatePlan) -> PlanErrorCode {
        enrich(plan).unwrap_err().code()
    }

    #[test]
    fn test_by_attribute_defaults() {
        let plan = CandidatePlan::new("select_by_attribute")
            .with_layer("buildings")
            .with_where("ST_Area(geom) > 100");
        let enriched = enrich(&plan).unwrap();
        assert_eq!(enriched.operation, Operation::SelectByAttribute);
        assert_eq!(enriched.limit, Some(200));
        assert_eq!(enriched.output_srid, 4326);
        assert_eq!(enriched.buffer_meters, None);
        assert_eq!(enriched.where_clause, "ST_Area(geom) > 100");
    }

    #[test]
    fn test_unsupported_operation() {
        assert_eq!(
            code(&CandidatePlan::new("select_everything").with_layer("buildings")),
            PlanErrorCode::UnsupportedOperation
        );
    }

    #[test]
    fn test_unknown_layer_lists_bounded_sample() {
        let err = enrich(&CandidatePlan::new("select_limit_only").with_layer("roadz")).unwrap_err();
        assert_eq!(err.code(), PlanErrorCode::UnknownLayer);
        assert!(err.message().contains("public.lakes"));
        assert!(!err.message().contains("public.forest"));
    }

    #[test]
    fn test_missing_layer_is_unknown_layer() {
        assert_eq!(code(&CandidatePlan::new("select_limit_only")), PlanErrorCode::UnknownLayer);
        assert_eq!(
            code(&CandidatePlan::new("select_limit_only").with_layer("  ")),
            PlanErrorCode::UnknownLayer
        );
    }

    #[test]
    fn test_single_target_operations_need_target() {
        for op in ["select_buffer", "select_intersect", "select_nearest", "select_within", "select_overlaps"] {
            let plan = CandidatePlan::new(op).with_layer("buildings");
            assert_eq!(code(&plan), PlanErrorCode::MissingTargetLayer, "{}", op);
            let blank = CandidatePlan::new(op).with_layer("buildings").with_target_layer(" ");
            assert_eq!(code(&blank), PlanErrorCode::MissingTargetLayer, "{}", op);
        }
    }

    #[test]
    fn test_multi_target_needs_targets() {
        let base = CandidatePlan::new("select_multi_target_buffer").with_layer("buildings");
        assert_eq!(code(&base), PlanErrorCode::MissingTargetLayers);
        assert_eq!(
            code(&base.clone().with_target_layers(Vec::<String>::new())),
            PlanErrorCode::MissingTargetLayers
        );

        let err = enrich(&base.clone().with_target_layers(["rivers", ""])).unwrap_err();
        assert_eq!(err.field(), "target_layers[1]");

        // target_layer alone does not satisfy the multi-target operation
        assert_eq!(
            code(&base.with_target_layer("rivers")),
            PlanErrorCode::MissingTargetLayers
        );
    }

    #[test]
    fn test_buffer_defaults_and_bounds() {
        let plan = CandidatePlan::new("select_buffer")
            .with_layer("buildings")
            .with_target_layer("rivers");
        assert_eq!(enrich(&plan).unwrap().buffer_meters, Some(100.0));
        assert_eq!(
            enrich(&plan.clone().with_buffer_meters(0.0)).unwrap().buffer_meters,
            Some(0.0)
        );
        assert_eq!(
            code(&plan.clone().with_buffer_meters(-1.0)),
            PlanErrorCode::InvalidBufferDistance
        );
        assert_eq!(
            code(&plan.with_buffer_meters(f64::INFINITY)),
            PlanErrorCode::InvalidBufferDistance
        );
    }

    #[test]
    fn test_non_buffer_operation_drops_distance() {
        let plan = CandidatePlan::new("select_intersect")
            .with_layer("buildings")
            .with_target_layer("flomsoner")
            .with_buffer_meters(-5.0);
        assert_eq!(enrich(&plan).unwrap().buffer_meters, None);
    }

    #[test]
    fn test_limit_validation() {
        let mut plan = CandidatePlan::new("select_limit_only").with_layer("buildings");
        plan.limit = serde_json::from_value(json!(-1)).unwrap();
        assert_eq!(code(&plan), PlanErrorCode::InvalidLimit);
        plan.limit = serde_json::from_value(json!(2.5)).unwrap();
        assert_eq!(code(&plan), PlanErrorCode::InvalidLimit);
        plan.limit = serde_json::from_value(json!(20.0)).unwrap();
        assert_eq!(enrich(&plan).unwrap().limit, Some(20));
        plan.limit = serde_json::from_value(json!(0)).unwrap();
        assert_eq!(enrich(&plan).unwrap().limit, Some(0));
    }

    #[test]
    fn test_output_srid_must_be_positive() {
        let plan = CandidatePlan::new("select_limit_only")
            .with_layer("buildings")
            .with_output_srid(0);
        assert_eq!(code(&plan), PlanErrorCode::InvalidOutputSrid);
    }

    #[test]
    fn test_validation_order() {
        // unknown layer is reported before the missing target
        let plan = CandidatePlan::new("select_buffer").with_layer("nowhere");
        assert_eq!(code(&plan), PlanErrorCode::UnknownLayer);
        // missing target before invalid limit
        let mut plan = CandidatePlan::new("select_buffer").with_layer("buildings");
        plan.limit = serde_json::from_value(json!(-3)).unwrap();
        assert_eq!(code(&plan), PlanErrorCode::MissingTargetLayer);
    }

    #[test]
    fn test_targets_must_be_table_names() {
        let plan = CandidatePlan::new("select_intersect")
            .with_layer("buildings")
            .with_target_layer("rivers b ON TRUE --");
        let err = enrich(&plan).unwrap_err();
        assert_eq!(err.code(), PlanErrorCode::UnknownLayer);
        assert_eq!(err.field(), "target_layer");

        let plan = CandidatePlan::new("select_multi_target_buffer")
            .with_layer("buildings")
            .with_target_layers(["kart.rivers", "roads) OR (TRUE"]);
        let err = enrich(&plan).unwrap_err();
        assert_eq!(err.code(), PlanErrorCode::UnknownLayer);
        assert_eq!(err.field(), "target_layers[1]");

        // schema-qualified names outside the catalog still pass when not strict
        let plan = CandidatePlan::new("select_within")
            .with_layer("buildings")
            .with_target_layer("kart.kommuner");
        assert_eq!(enrich(&plan).unwrap().target_layer.as_deref(), Some("kart.kommuner"));
    }

    #[test]
    fn test_strict_target_layers() {
        let defaults = EnrichmentDefaults {
            strict_target_layers: true,
            ..EnrichmentDefaults::default()
        };
        let catalog = catalog();
        let validator = PlanValidator::new(&catalog, &defaults);
        let plan = CandidatePlan::new("select_multi_target_buffer")
            .with_layer("buildings")
            .with_target_layers(["rivers", "railways"]);
        let err = validator.validate_and_enrich(&plan, None).unwrap_err();
        assert_eq!(err.code(), PlanErrorCode::UnknownLayer);
        assert_eq!(err.field(), "target_layers[1]");

        // the lenient default passes unknown targets through
        assert!(validate_and_enrich(&plan, &catalog, None).is_ok());
    }

    #[test]
    fn test_containment_combination() {
        let bbox = "a.geom && ST_MakeEnvelope(0, 0, 1, 1, 4326)";
        let plan = CandidatePlan::new("select_by_attribute")
            .with_layer("buildings")
            .with_where("height > 20");
        let enriched = validate_and_enrich(&plan, &catalog(), Some(bbox)).unwrap();
        assert_eq!(
            enriched.where_clause,
            format!("(height > 20) AND ({})", bbox)
        );

        let bare = CandidatePlan::new("select_limit_only").with_layer("buildings");
        assert_eq!(
            validate_and_enrich(&bare, &catalog(), Some(bbox)).unwrap().where_clause,
            bbox
        );
        assert_eq!(enrich(&bare).unwrap().where_clause, "TRUE");
    }

    #[test]
    fn test_structured_filters_join_where_clause() {
        let plan = CandidatePlan::new("select_by_attribute")
            .with_layer("buildings")
            .with_where("ST_Area(geom) > 100")
            .with_filter(FilterExpr::eq("kind", json!("school")));
        assert_eq!(
            enrich(&plan).unwrap().where_clause,
            "(ST_Area(geom) > 100) AND (a.kind = 'school')"
        );
    }

    #[test]
    fn test_combine_where_clauses() {
        assert_eq!(combine_where_clauses(None, None), "TRUE");
        assert_eq!(combine_where_clauses(Some("  "), Some("")), "TRUE");
        assert_eq!(combine_where_clauses(Some("x > 1"), None), "x > 1");
        assert_eq!(combine_where_clauses(None, Some("c")), "c");
        assert_eq!(combine_where_clauses(Some("x"), Some("c")), "(x) AND (c)");
    }
}
