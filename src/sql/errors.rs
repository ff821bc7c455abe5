//! SQL synthesis error types
//!
//! Error codes:
//! - GEOPLAN_SYNTHESIS_ERROR (REJECT)
//!
//! Synthesis only fails when handed a plan that did not come out of
//! enrichment intact.

use std::fmt;

use crate::error::Severity;

/// Synthesis error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisErrorCode {
    /// Plan violates an enrichment guarantee
    SynthesisError,
}

impl SynthesisErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            SynthesisErrorCode::SynthesisError => "GEOPLAN_SYNTHESIS_ERROR",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for SynthesisErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct SynthesisError {
    code: SynthesisErrorCode,
    message: String,
}

impl SynthesisError {
    /// `operation` could not be rendered because of `reason`
    pub fn invalid_plan(operation: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self {
            code: SynthesisErrorCode::SynthesisError,
            message: format!("Cannot synthesize '{}': {}", operation, reason.into()),
        }
    }

    pub fn code(&self) -> SynthesisErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SynthesisError {
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

impl std::error::Error for SynthesisError {}

/// Result type for SQL synthesis
pub type SynthesisResult<T> = Result<T, SynthesisError>;
