//! SQL synthesis
//!
//! Renders an `EnrichedPlan` as one PostGIS `SELECT` statement. Synthesis
//! never executes anything and never consults the catalog: identifiers
//! were checked during enrichment.

mod builder;
mod errors;
mod normalize;
mod options;

pub use builder::{qualify_identifier, synthesize};
pub use errors::{SynthesisError, SynthesisErrorCode, SynthesisResult};
pub use normalize::{normalize_where_clause, normalize_where_clause_with};
pub use options::SqlOptions;
