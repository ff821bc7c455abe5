//! Request pipeline
//!
//! Wires retrieval, boundary resolution, enrichment and synthesis together
//! for one request at a time.

mod cancel;
mod planner;

pub use cancel::CancelToken;
pub use planner::{PlanOutcome, PlanRequest, Planner};
