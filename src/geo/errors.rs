//! Geographic boundary error types
//!
//! Error codes:
//! - GEOPLAN_EMPTY_BOUNDARY (REJECT)
//! - GEOPLAN_INVALID_BOUNDARY (REJECT)
//! - GEOPLAN_MUNICIPALITY_NOT_FOUND (REJECT)
//! - GEOPLAN_GAZETTEER_UNAVAILABLE (REJECT)

use std::fmt;

use crate::error::Severity;

/// Geo error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Boundary has no vertices
    EmptyBoundary,
    /// Non-finite coordinate, inverted bounds or degenerate ring
    InvalidBoundary,
    /// Gazetteer does not know the municipality
    MunicipalityNotFound,
    /// Gazetteer could not be reached
    GazetteerUnavailable,
}

impl GeoErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            GeoErrorCode::EmptyBoundary => "GEOPLAN_EMPTY_BOUNDARY",
            GeoErrorCode::InvalidBoundary => "GEOPLAN_INVALID_BOUNDARY",
            GeoErrorCode::MunicipalityNotFound => "GEOPLAN_MUNICIPALITY_NOT_FOUND",
            GeoErrorCode::GazetteerUnavailable => "GEOPLAN_GAZETTEER_UNAVAILABLE",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for GeoErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct GeoError {
    code: GeoErrorCode,
    message: String,
}

impl GeoError {
    fn new(code: GeoErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn empty_boundary() -> Self {
        Self::new(GeoErrorCode::EmptyBoundary, "Boundary contains no vertices")
    }

    pub fn invalid_boundary(reason: impl Into<String>) -> Self {
        Self::new(GeoErrorCode::InvalidBoundary, reason)
    }

    pub fn municipality_not_found(name: &str) -> Self {
        Self::new(
            GeoErrorCode::MunicipalityNotFound,
            format!("Municipality '{}' not found", name),
        )
    }

    pub fn gazetteer_unavailable(reason: impl Into<String>) -> Self {
        Self::new(
            GeoErrorCode::GazetteerUnavailable,
            format!("Gazetteer unavailable: {}", reason.into()),
        )
    }

    pub fn code(&self) -> GeoErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for GeoError {
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

impl std::error::Error for GeoError {}

/// Result type for geo operations
pub type GeoResult<T> = Result<T, GeoError>;
