//! CLI command implementations
//!
//! Every command follows the same lifecycle:
//! 1. Load and validate configuration
//! 2. Load the layer index
//! 3. Read one request from stdin
//! 4. Write one response to stdout
//!
//! Configuration and index failures are fatal (non-zero exit). A rejected
//! request is a normal outcome and is reported as an error response.

use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use super::args::Command;
use super::errors::{CliErrorCode, CliResult};
use super::io::{read_request, write_error, write_response};
use crate::catalog::LayerIndexLoader;
use crate::config::GeoplanConfig;
use crate::error::GeoplanError;
use crate::geo::GeographicBoundary;
use crate::observability::Logger;
use crate::pipeline::{CancelToken, Planner};
use crate::plan::CandidatePlan;
use crate::retrieval::{format_layer_context, rank_entries};

/// Input of `synthesize` and `enrich`
#[derive(Debug, Deserialize)]
struct PlanInput {
    plan: CandidatePlan,
    #[serde(default)]
    boundary: Option<GeographicBoundary>,
}

/// Input of `retrieve`: a query vector from the external embedding provider
#[derive(Debug, Deserialize)]
struct RetrieveInput {
    embedding: Vec<f32>,
    #[serde(default)]
    k: Option<usize>,
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut out = stdout.lock();

    match cmd {
        Command::Synthesize { config } => synthesize(&config, &mut input, &mut out),
        Command::Enrich { config } => enrich(&config, &mut input, &mut out),
        Command::Retrieve { config } => retrieve(&config, &mut input, &mut out),
        Command::Layers { config } => layers(&config, &mut out),
    }
}

/// Validate, enrich and synthesize one candidate plan
pub fn synthesize<R: Read, W: Write>(config_path: &Path, input: &mut R, out: &mut W) -> CliResult<()> {
    let (_, planner) = boot(config_path)?;
    let Some(request) = read_or_reject::<_, _, PlanInput>(input, out)? else {
        return Ok(());
    };

    match planner.plan_with_boundary(&request.plan, request.boundary.as_ref(), &CancelToken::new()) {
        Ok(outcome) => write_response(out, serde_json::to_value(&outcome)?),
        Err(e) => reject(out, &e),
    }
}

/// Validate and enrich one candidate plan without synthesizing SQL
pub fn enrich<R: Read, W: Write>(config_path: &Path, input: &mut R, out: &mut W) -> CliResult<()> {
    let (_, planner) = boot(config_path)?;
    let Some(request) = read_or_reject::<_, _, PlanInput>(input, out)? else {
        return Ok(());
    };

    match planner.enrich(&request.plan, request.boundary.as_ref()) {
        Ok(plan) => write_response(out, json!({ "plan": plan })),
        Err(e) => reject(out, &e),
    }
}

/// Rank catalog layers against a precomputed query vector
pub fn retrieve<R: Read, W: Write>(config_path: &Path, input: &mut R, out: &mut W) -> CliResult<()> {
    let (config, planner) = boot(config_path)?;
    let Some(request) = read_or_reject::<_, _, RetrieveInput>(input, out)? else {
        return Ok(());
    };

    let k = request.k.unwrap_or(config.retrieval_k);
    let top = rank_entries(planner.catalog(), &request.embedding, k, config.retrieval_min_score);
    write_response(
        out,
        json!({
            "context": format_layer_context(&top),
            "layers": top,
        }),
    )
}

/// List the catalog in index order
pub fn layers<W: Write>(config_path: &Path, out: &mut W) -> CliResult<()> {
    let (_, planner) = boot(config_path)?;
    let catalog = planner.catalog();

    let layers: Vec<Value> = catalog
        .entries()
        .iter()
        .map(|e| {
            json!({
                "layer": e.layer,
                "description": e.description,
                "dimension": e.embedding.len(),
            })
        })
        .collect();

    write_response(
        out,
        json!({
            "count": catalog.len(),
            "dimension": catalog.dimension(),
            "layers": layers,
        }),
    )
}

/// Configuration, log level and catalog, in that order
fn boot(config_path: &Path) -> CliResult<(GeoplanConfig, Planner)> {
    let config = GeoplanConfig::load(config_path)?;
    Logger::set_min_severity(config.log_severity()?);

    let catalog = LayerIndexLoader::new(config.index_path.clone()).load(&config.default_schema)?;
    let planner = Planner::new(Arc::new(catalog), &config);
    Ok((config, planner))
}

/// Malformed requests get an error response; I/O failures stay fatal
fn read_or_reject<R: Read, W: Write, T: serde::de::DeserializeOwned>(
    input: &mut R,
    out: &mut W,
) -> CliResult<Option<T>> {
    match read_request(input) {
        Ok(request) => Ok(Some(request)),
        Err(e) if e.code() == &CliErrorCode::InvalidRequest => {
            write_error(out, e.code_str(), e.message())?;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn reject<W: Write>(out: &mut W, error: &GeoplanError) -> CliResult<()> {
    write_error(out, error.code(), &error.message())
}
