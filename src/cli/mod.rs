//! CLI module for geoplan
//!
//! One request per invocation, JSON over stdio:
//! - synthesize: candidate plan to SQL
//! - enrich: candidate plan to enriched plan
//! - retrieve: query vector to ranked layers
//! - layers: list the catalog

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{enrich, layers, retrieve, run, run_command, synthesize};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
