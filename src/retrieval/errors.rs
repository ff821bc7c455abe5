//! Retrieval error types
//!
//! Error codes:
//! - GEOPLAN_RETRIEVAL_UNAVAILABLE (REJECT, recoverable by the caller)

use std::fmt;

use crate::error::Severity;

/// Retrieval error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalErrorCode {
    /// Embedding provider unreachable or failed
    RetrievalUnavailable,
}

impl RetrievalErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            RetrievalErrorCode::RetrievalUnavailable => "GEOPLAN_RETRIEVAL_UNAVAILABLE",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for RetrievalErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Retrieval error.
///
/// The caller may continue without retrieval context; this crate never
/// substitutes an empty result on its own.
#[derive(Debug, Clone)]
pub struct RetrievalError {
    code: RetrievalErrorCode,
    message: String,
}

impl RetrievalError {
    /// The embedding provider could not produce a vector
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            code: RetrievalErrorCode::RetrievalUnavailable,
            message: format!("Embedding provider unavailable: {}", reason.into()),
        }
    }

    pub fn code(&self) -> RetrievalErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Retrieval context is advisory; callers may always proceed without it
    pub fn is_recoverable(&self) -> bool {
        true
    }
}

impl fmt::Display for RetrievalError {
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

impl std::error::Error for RetrievalError {}

/// Result type for retrieval operations
pub type RetrievalResult<T> = Result<T, RetrievalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_display() {
        let err = RetrievalError::unavailable("timeout after 10s");
        let display = err.to_string();
        assert!(display.contains("GEOPLAN_RETRIEVAL_UNAVAILABLE"));
        assert!(display.contains("timeout after 10s"));
        assert!(err.is_recoverable());
    }
}
