//! geoplan - deterministic spatial query plans for PostGIS
//!
//! Turns a candidate plan (usually proposed by a language model) into a
//! validated, enriched plan and a single SQL statement:
//!
//! 1. Retrieve the catalog layers most relevant to a question
//! 2. Resolve an optional municipality to a geographic boundary
//! 3. Validate the candidate plan and fill in defaults
//! 4. Synthesize PostGIS SQL from the enriched plan
//!
//! Nothing here talks to a database or a model; both sit behind traits.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod geo;
pub mod observability;
pub mod pipeline;
pub mod plan;
pub mod retrieval;
pub mod sql;
