//! CLI argument definitions using clap
//!
//! Commands:
//! - geoplan synthesize --config <path>
//! - geoplan enrich --config <path>
//! - geoplan retrieve --config <path>
//! - geoplan layers --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// geoplan - deterministic spatial query plans for PostGIS
#[derive(Parser, Debug)]
#[command(name = "geoplan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read `{plan, boundary?}` from stdin and print the SQL
    Synthesize {
        /// Path to configuration file
        #[arg(long, default_value = "./geoplan.json")]
        config: PathBuf,
    },

    /// Read `{plan, boundary?}` from stdin and print the enriched plan
    Enrich {
        /// Path to configuration file
        #[arg(long, default_value = "./geoplan.json")]
        config: PathBuf,
    },

    /// Read `{embedding, k?}` from stdin and print the closest layers
    Retrieve {
        /// Path to configuration file
        #[arg(long, default_value = "./geoplan.json")]
        config: PathBuf,
    },

    /// List the layer catalog
    Layers {
        /// Path to configuration file
        #[arg(long, default_value = "./geoplan.json")]
        config: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
