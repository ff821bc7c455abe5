//! Crate-level error type
//!
//! Every subsystem reports its own coded error (`GEOPLAN_*`). `GeoplanError`
//! wraps them for callers that drive the whole pipeline.

use std::fmt;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::geo::GeoError;
use crate::plan::PlanError;
use crate::retrieval::RetrievalError;
use crate::sql::SynthesisError;

/// Severity of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The request is rejected; the process keeps serving
    Reject,
    /// Startup cannot continue
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Any failure raised by geoplan
#[derive(Debug, Clone, Error)]
pub enum GeoplanError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Retrieval(#[from] RetrievalError),

    #[error("{0}")]
    Geo(#[from] GeoError),

    #[error("{0}")]
    Plan(#[from] PlanError),

    #[error("{0}")]
    Synthesis(#[from] SynthesisError),

    /// The caller cancelled the request between stages
    #[error("[REJECT] GEOPLAN_CANCELLED: request cancelled during {stage}")]
    Cancelled { stage: &'static str },
}

impl GeoplanError {
    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            GeoplanError::Config(e) => e.code().code(),
            GeoplanError::Catalog(e) => e.code().code(),
            GeoplanError::Retrieval(e) => e.code().code(),
            GeoplanError::Geo(e) => e.code().code(),
            GeoplanError::Plan(e) => e.code().code(),
            GeoplanError::Synthesis(e) => e.code().code(),
            GeoplanError::Cancelled { .. } => "GEOPLAN_CANCELLED",
        }
    }

    /// Severity of the wrapped error
    pub fn severity(&self) -> Severity {
        match self {
            GeoplanError::Config(_) | GeoplanError::Catalog(_) => Severity::Fatal,
            _ => Severity::Reject,
        }
    }

    /// Human-readable message without the code prefix
    pub fn message(&self) -> String {
        match self {
            GeoplanError::Config(e) => e.message().to_string(),
            GeoplanError::Catalog(e) => e.message().to_string(),
            GeoplanError::Retrieval(e) => e.message().to_string(),
            GeoplanError::Geo(e) => e.message().to_string(),
            GeoplanError::Plan(e) => e.message().to_string(),
            GeoplanError::Synthesis(e) => e.message().to_string(),
            GeoplanError::Cancelled { stage } => format!("request cancelled during {}", stage),
        }
    }
}

/// Result type for pipeline-level operations
pub type GeoplanResult<T> = Result<T, GeoplanError>;
