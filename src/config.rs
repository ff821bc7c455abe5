//! Configuration
//!
//! A single JSON file. Only `index_path` is required; every other key has
//! a default. Configuration is loaded once and validated before anything
//! else starts.
//!
//! Error codes:
//! - GEOPLAN_CONFIG_UNREADABLE (FATAL)
//! - GEOPLAN_CONFIG_INVALID (FATAL)

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Severity;
use crate::geo::TargetSrid;
use crate::observability::{log_event_with_fields, Event, Severity as LogSeverity};
use crate::plan::EnrichmentDefaults;
use crate::sql::SqlOptions;

/// Configuration error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    /// File missing or not valid JSON
    ConfigUnreadable,
    /// A value is out of range
    ConfigInvalid,
}

impl ConfigErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigErrorCode::ConfigUnreadable => "GEOPLAN_CONFIG_UNREADABLE",
            ConfigErrorCode::ConfigInvalid => "GEOPLAN_CONFIG_INVALID",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    code: ConfigErrorCode,
    message: String,
}

impl ConfigError {
    pub fn unreadable(msg: impl Into<String>) -> Self {
        Self {
            code: ConfigErrorCode::ConfigUnreadable,
            message: msg.into(),
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self {
            code: ConfigErrorCode::ConfigInvalid,
            message: msg.into(),
        }
    }

    pub fn code(&self) -> ConfigErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for ConfigError {}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoplanConfig {
    /// Layer index file (required)
    pub index_path: PathBuf,

    /// Schema for unqualified layer names (default "public")
    #[serde(default = "default_schema")]
    pub default_schema: String,

    #[serde(default = "default_geometry_column")]
    pub geometry_column: String,

    /// Alias of the primary table in generated SQL (default "a")
    #[serde(default = "default_primary_alias")]
    pub primary_alias: String,

    #[serde(default = "default_limit")]
    pub default_limit: u64,

    #[serde(default = "default_buffer_meters")]
    pub default_buffer_meters: f64,

    #[serde(default = "default_output_srid")]
    pub default_output_srid: i64,

    /// Valid layers listed in an unknown-layer rejection (default 5)
    #[serde(default = "default_unknown_layer_sample")]
    pub unknown_layer_sample: usize,

    /// Reject target layers missing from the catalog (default false)
    #[serde(default)]
    pub strict_target_layers: bool,

    /// Layers returned by retrieval (default 5)
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,

    #[serde(default)]
    pub retrieval_min_score: Option<f64>,

    /// Secondary sort key for nearest-neighbour queries
    #[serde(default)]
    pub nearest_tiebreak_column: Option<String>,

    /// SRID boundaries are reprojected into; the geometry's own when unset
    #[serde(default)]
    pub containment_srid: Option<i32>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema() -> String {
    "public".to_string()
}
fn default_geometry_column() -> String {
    "geom".to_string()
}
fn default_primary_alias() -> String {
    "a".to_string()
}
fn default_limit() -> u64 {
    200
}
fn default_buffer_meters() -> f64 {
    100.0
}
fn default_output_srid() -> i64 {
    4326
}
fn default_unknown_layer_sample() -> usize {
    5
}
fn default_retrieval_k() -> usize {
    5
}
fn default_log_level() -> String {
    "INFO".to_string()
}

impl GeoplanConfig {
    /// Defaults for everything but the index location
    pub fn default_for(index_path: impl Into<PathBuf>) -> Self {
        Self {
            index_path: index_path.into(),
            default_schema: default_schema(),
            geometry_column: default_geometry_column(),
            primary_alias: default_primary_alias(),
            default_limit: default_limit(),
            default_buffer_meters: default_buffer_meters(),
            default_output_srid: default_output_srid(),
            unknown_layer_sample: default_unknown_layer_sample(),
            strict_target_layers: false,
            retrieval_k: default_retrieval_k(),
            retrieval_min_score: None,
            nearest_tiebreak_column: None,
            containment_srid: None,
            log_level: default_log_level(),
        }
    }

    /// Load and validate configuration from file.
    ///
    /// A relative `index_path` is resolved against the config file's
    /// directory.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::unreadable(format!("Failed to read config '{}': {}", path.display(), e))
        })?;

        let mut config: GeoplanConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::unreadable(format!("Invalid config JSON: {}", e)))?;

        if config.index_path.is_relative() {
            if let Some(dir) = path.parent() {
                config.index_path = dir.join(&config.index_path);
            }
        }

        config.validate()?;

        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("index_path", &config.index_path.display().to_string()),
                ("path", &path.display().to_string()),
            ],
        );
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.index_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("index_path must not be empty"));
        }

        for (key, value) in [
            ("default_schema", &self.default_schema),
            ("geometry_column", &self.geometry_column),
            ("primary_alias", &self.primary_alias),
        ] {
            if !is_identifier(value) {
                return Err(ConfigError::invalid(format!(
                    "{} must be a plain SQL identifier, got '{}'",
                    key, value
                )));
            }
        }
        if let Some(column) = &self.nearest_tiebreak_column {
            if !is_identifier(column) {
                return Err(ConfigError::invalid(format!(
                    "nearest_tiebreak_column must be a plain SQL identifier, got '{}'",
                    column
                )));
            }
        }
        // Target aliases are fixed (`b`, `b1..bn`); the primary alias must not shadow them
        let options = self.sql_options();
        if options.aliases_collide() {
            return Err(ConfigError::invalid(format!(
                "primary_alias '{}' collides with the target aliases '{}' and '{}1..n'",
                options.primary_alias, options.target_alias, options.target_alias
            )));
        }

        if !self.default_buffer_meters.is_finite() || self.default_buffer_meters < 0.0 {
            return Err(ConfigError::invalid("default_buffer_meters must be a finite number >= 0"));
        }
        if self.default_output_srid <= 0 {
            return Err(ConfigError::invalid("default_output_srid must be > 0"));
        }
        if matches!(self.containment_srid, Some(srid) if srid <= 0) {
            return Err(ConfigError::invalid("containment_srid must be > 0"));
        }
        if self.unknown_layer_sample == 0 {
            return Err(ConfigError::invalid("unknown_layer_sample must be > 0"));
        }
        if let Some(min) = self.retrieval_min_score {
            if !(-1.0..=1.0).contains(&min) {
                return Err(ConfigError::invalid("retrieval_min_score must be within [-1, 1]"));
            }
        }

        self.log_severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn log_severity(&self) -> ConfigResult<LogSeverity> {
        LogSeverity::from_str(&self.log_level)
            .map_err(|e| ConfigError::invalid(format!("log_level: {}", e)))
    }

    pub fn enrichment_defaults(&self) -> EnrichmentDefaults {
        EnrichmentDefaults {
            limit: self.default_limit,
            buffer_meters: self.default_buffer_meters,
            output_srid: self.default_output_srid,
            unknown_layer_sample: self.unknown_layer_sample,
            strict_target_layers: self.strict_target_layers,
            primary_alias: self.primary_alias.clone(),
        }
    }

    pub fn sql_options(&self) -> SqlOptions {
        SqlOptions {
            schema: self.default_schema.clone(),
            primary_alias: self.primary_alias.clone(),
            geometry_column: self.geometry_column.clone(),
            nearest_tiebreak: self.nearest_tiebreak_column.clone(),
            ..SqlOptions::default()
        }
    }

    pub fn target_srid(&self) -> TargetSrid {
        match self.containment_srid {
            Some(srid) => TargetSrid::Fixed(srid),
            None => TargetSrid::OfGeometry,
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
