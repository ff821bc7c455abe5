//! Plan Synthesis Tests
//!
//! End-to-end checks from candidate plan to SQL text:
//! - Defaults are applied before synthesis
//! - Every accepted plan yields exactly one top-level SELECT
//! - Rejected plans never yield SQL
//! - Output is byte-identical across runs

use geoplan::catalog::LayerCatalog;
use geoplan::plan::{
    validate_and_enrich, CandidatePlan, FilterExpr, Operation, PlanErrorCode,
};
use geoplan::sql::{normalize_where_clause, synthesize, SqlOptions};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn catalog() -> LayerCatalog {
    LayerCatalog::from_descriptions(
        [
            ("public.buildings", "GIS layer named buildings"),
            ("public.rivers", "GIS layer named rivers"),
            ("public.roads", "GIS layer named roads"),
            ("public.schools", "GIS layer named schools"),
        ],
        "public",
    )
    .unwrap()
}

fn plan_sql(candidate: &CandidatePlan) -> String {
    let enriched = validate_and_enrich(candidate, &catalog(), None).unwrap();
    synthesize(&enriched, &SqlOptions::default()).unwrap()
}

/// A valid candidate for every operation
fn valid_candidates() -> Vec<CandidatePlan> {
    Operation::ALL
        .iter()
        .map(|op| {
            let candidate = CandidatePlan::new(op.as_str()).with_layer("buildings");
            if op.requires_target_layer() {
                candidate.with_target_layer("rivers")
            } else if op.requires_target_layers() {
                candidate.with_target_layers(["rivers", "roads"])
            } else {
                candidate
            }
        })
        .collect()
}

// =============================================================================
// Default Enrichment Tests
// =============================================================================

#[test]
fn test_attribute_filter_gets_default_limit() {
    let candidate: CandidatePlan = serde_json::from_value(json!({
        "operation": "select_by_attribute",
        "layer": "buildings",
        "where_clause": "ST_Area(geom) > 100",
        "limit": null
    }))
    .unwrap();

    let enriched = validate_and_enrich(&candidate, &catalog(), None).unwrap();
    assert_eq!(enriched.limit, Some(200));

    let sql = synthesize(&enriched, &SqlOptions::default()).unwrap();
    assert!(sql.contains("FROM public.buildings a"));
    assert!(sql.contains("WHERE ST_Area(a.geom) > 100"));
    assert!(sql.ends_with("LIMIT 200"));
}

#[test]
fn test_buffer_gets_default_distance() {
    let candidate: CandidatePlan = serde_json::from_value(json!({
        "operation": "select_buffer",
        "layer": "buildings",
        "target_layer": "rivers",
        "buffer_meters": null
    }))
    .unwrap();

    let enriched = validate_and_enrich(&candidate, &catalog(), None).unwrap();
    assert_eq!(enriched.buffer_meters, Some(100.0));

    let sql = synthesize(&enriched, &SqlOptions::default()).unwrap();
    assert!(sql.contains("JOIN public.rivers b ON a.geom && ST_Expand(b.geom, 100)"));
    assert!(sql.contains("ST_DWithin(a.geom, b.geom, 100)"));
}

#[test]
fn test_multi_target_buffer_one_exists_per_target() {
    let candidate = CandidatePlan::new("select_multi_target_buffer")
        .with_layer("schools")
        .with_target_layers(["rivers", "roads"])
        .with_buffer_meters(250.0);

    let sql = plan_sql(&candidate);
    assert_eq!(sql.matches("EXISTS (SELECT 1 FROM").count(), 2);
    assert!(sql.contains("FROM public.rivers b1"));
    assert!(sql.contains("FROM public.roads b2"));
    assert!(sql.contains("ST_DWithin(a.geom, b2.geom, 250)"));
}

#[test]
fn test_structured_filters_join_free_text() {
    let candidate = CandidatePlan::new("select_by_attribute")
        .with_layer("buildings")
        .with_where("height > 10")
        .with_filter(FilterExpr::eq("kind", json!("school")));

    let sql = plan_sql(&candidate);
    assert!(sql.contains("WHERE (height > 10) AND (a.kind = 'school')"));
}

// =============================================================================
// Statement Shape Tests
// =============================================================================

/// Every accepted plan starts with SELECT and has one top-level SELECT.
#[test]
fn test_single_top_level_select() {
    for candidate in valid_candidates() {
        let sql = plan_sql(&candidate);
        assert!(sql.starts_with("SELECT "), "{}", sql);
        assert!(!sql.trim_end().ends_with(';'), "{}", sql);

        let nested = sql.matches("EXISTS (SELECT").count();
        assert_eq!(sql.matches("SELECT").count() - nested, 1, "{}", sql);
        if candidate.operation != "select_multi_target_buffer" {
            assert_eq!(nested, 0, "{}", sql);
        }
    }
}

/// Same plan, same bytes.
#[test]
fn test_synthesis_is_deterministic() {
    for candidate in valid_candidates() {
        let first = plan_sql(&candidate);
        for _ in 0..10 {
            assert_eq!(plan_sql(&candidate), first);
        }
    }
}

#[test]
fn test_join_operations_use_bbox_prefilter() {
    for (op, predicate) in [
        ("select_intersect", "ST_Intersects"),
        ("select_within", "ST_Within"),
        ("select_overlaps", "ST_Overlaps"),
    ] {
        let candidate = CandidatePlan::new(op)
            .with_layer("buildings")
            .with_target_layer("rivers");
        let sql = plan_sql(&candidate);
        assert!(
            sql.contains(&format!("ON a.geom && b.geom AND {}(a.geom, b.geom)", predicate)),
            "{}",
            sql
        );
    }
}

#[test]
fn test_nearest_orders_by_distance() {
    let candidate = CandidatePlan::new("select_nearest")
        .with_layer("schools")
        .with_target_layer("roads")
        .with_limit(3);

    let sql = plan_sql(&candidate);
    assert!(sql.contains("CROSS JOIN public.roads b"));
    assert!(sql.contains("ORDER BY a.geom <-> b.geom ASC"));
    assert!(sql.ends_with("LIMIT 3"));
}

#[test]
fn test_output_srid_in_projection() {
    let candidate = CandidatePlan::new("select_limit_only")
        .with_layer("buildings")
        .with_output_srid(25833);

    let sql = plan_sql(&candidate);
    assert!(sql.starts_with("SELECT a.*, ST_AsText(ST_Transform(a.geom, 25833)) AS wkt_geom"));
}

// =============================================================================
// Rejection Tests
// =============================================================================

#[test]
fn test_missing_targets_never_produce_sql() {
    let cases = [
        (CandidatePlan::new("select_buffer").with_layer("buildings"), PlanErrorCode::MissingTargetLayer),
        (CandidatePlan::new("select_nearest").with_layer("buildings").with_target_layer("  "), PlanErrorCode::MissingTargetLayer),
        (CandidatePlan::new("select_multi_target_buffer").with_layer("buildings"), PlanErrorCode::MissingTargetLayers),
        (
            CandidatePlan::new("select_multi_target_buffer")
                .with_layer("buildings")
                .with_target_layers(Vec::<String>::new()),
            PlanErrorCode::MissingTargetLayers,
        ),
    ];

    for (candidate, expected) in cases {
        let err = validate_and_enrich(&candidate, &catalog(), None).unwrap_err();
        assert_eq!(err.code(), expected, "{:?}", candidate);
    }
}

#[test]
fn test_unknown_layer_names_samples() {
    let candidate = CandidatePlan::new("select_limit_only").with_layer("parks");
    let err = validate_and_enrich(&candidate, &catalog(), None).unwrap_err();

    assert_eq!(err.code(), PlanErrorCode::UnknownLayer);
    assert_eq!(err.field(), "layer");
    assert!(err.message().contains("public.buildings"));
}

#[test]
fn test_unsupported_operation() {
    let candidate = CandidatePlan::new("drop_table").with_layer("buildings");
    let err = validate_and_enrich(&candidate, &catalog(), None).unwrap_err();
    assert_eq!(err.code(), PlanErrorCode::UnsupportedOperation);
}

// =============================================================================
// Normalization Tests
// =============================================================================

#[test]
fn test_normalization_is_idempotent() {
    let clauses = [
        "ST_Area(geom) > 100",
        "GEOM IS NOT NULL AND name = 'geom'",
        "a.geom && b.geom",
        "",
        "ST_Length(geom) > 5 AND \"geom\" IS NULL",
    ];
    for clause in clauses {
        let once = normalize_where_clause(clause);
        assert_eq!(normalize_where_clause(&once), once, "{}", clause);
    }
}

#[test]
fn test_normalization_leaves_literals_alone() {
    assert_eq!(
        normalize_where_clause("name = 'geom' AND geom IS NOT NULL"),
        "name = 'geom' AND a.geom IS NOT NULL"
    );
    assert_eq!(normalize_where_clause("   "), "TRUE");
}

/// Target names are spliced into the statement and must be table names.
#[test]
fn test_injected_target_never_produces_sql() {
    let candidate = CandidatePlan::new("select_buffer")
        .with_layer("buildings")
        .with_target_layer("rivers b ON TRUE --");
    let err = validate_and_enrich(&candidate, &catalog(), None).unwrap_err();
    assert_eq!(err.code(), PlanErrorCode::UnknownLayer);
    assert_eq!(err.value(), Some("rivers b ON TRUE --"));
}
