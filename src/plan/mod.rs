//! Plan validation and enrichment
//!
//! Turns a loosely typed candidate plan into an `EnrichedPlan` the SQL
//! synthesizer can rely on.
//!
//! # Guarantees
//!
//! - `operation` is one of the closed set, or the plan is rejected
//! - `layer` exists in the catalog
//! - Targets are present as the operation requires
//! - `buffer_meters` is finite and >= 0 for buffer-class operations
//! - `limit` and `output_srid` are always set
//! - `where_clause` is never empty (`TRUE` when nothing filters)

mod errors;
mod filter;
mod types;
mod validator;

pub use errors::{PlanError, PlanErrorCode, PlanResult};
pub use filter::{is_layer_identifier, render_filters, FilterExpr, FilterOperator};
pub use types::{CandidatePlan, EnrichedPlan, Operation};
pub use validator::{combine_where_clauses, validate_and_enrich, EnrichmentDefaults, PlanValidator};
