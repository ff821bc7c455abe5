//! Layer catalog error types
//!
//! Error codes:
//! - GEOPLAN_INDEX_UNREADABLE (FATAL)
//! - GEOPLAN_INDEX_MALFORMED (FATAL)
//! - GEOPLAN_INDEX_WRITE_FAILED (FATAL)
//! - GEOPLAN_DUPLICATE_LAYER (FATAL)
//! - GEOPLAN_EMBEDDING_DIMENSION_MISMATCH (FATAL)
//! - GEOPLAN_INDEX_BUILD_FAILED (FATAL)

use std::fmt;

use crate::error::Severity;

/// Catalog error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorCode {
    /// Index file could not be read
    IndexUnreadable,
    /// Index file is not a valid array of layer records
    IndexMalformed,
    /// Index file could not be written
    IndexWriteFailed,
    /// Two records name the same layer
    DuplicateLayer,
    /// Embeddings of different lengths in one index
    DimensionMismatch,
    /// Embedding provider failed while building an index
    IndexBuildFailed,
}

impl CatalogErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            CatalogErrorCode::IndexUnreadable => "GEOPLAN_INDEX_UNREADABLE",
            CatalogErrorCode::IndexMalformed => "GEOPLAN_INDEX_MALFORMED",
            CatalogErrorCode::IndexWriteFailed => "GEOPLAN_INDEX_WRITE_FAILED",
            CatalogErrorCode::DuplicateLayer => "GEOPLAN_DUPLICATE_LAYER",
            CatalogErrorCode::DimensionMismatch => "GEOPLAN_EMBEDDING_DIMENSION_MISMATCH",
            CatalogErrorCode::IndexBuildFailed => "GEOPLAN_INDEX_BUILD_FAILED",
        }
    }

    /// Catalog errors happen at startup or offline and are always fatal
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for CatalogErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Catalog error with the path or layer it concerns
#[derive(Debug, Clone)]
pub struct CatalogError {
    code: CatalogErrorCode,
    message: String,
}

impl CatalogError {
    fn new(code: CatalogErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unreadable(path: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::new(
            CatalogErrorCode::IndexUnreadable,
            format!("Failed to read layer index '{}': {}", path, reason),
        )
    }

    pub fn malformed(path: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::new(
            CatalogErrorCode::IndexMalformed,
            format!("Layer index '{}' is malformed: {}", path, reason),
        )
    }

    pub fn write_failed(path: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::new(
            CatalogErrorCode::IndexWriteFailed,
            format!("Failed to write layer index '{}': {}", path, reason),
        )
    }

    pub fn duplicate_layer(layer: impl fmt::Display) -> Self {
        Self::new(
            CatalogErrorCode::DuplicateLayer,
            format!("Layer '{}' appears more than once", layer),
        )
    }

    pub fn dimension_mismatch(layer: impl fmt::Display, expected: usize, actual: usize) -> Self {
        Self::new(
            CatalogErrorCode::DimensionMismatch,
            format!(
                "Layer '{}' has embedding dimension {}, expected {}",
                layer, actual, expected
            ),
        )
    }

    pub fn build_failed(layer: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::new(
            CatalogErrorCode::IndexBuildFailed,
            format!("Failed to embed layer '{}': {}", layer, reason),
        )
    }

    pub fn code(&self) -> CatalogErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CatalogError {
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

impl std::error::Error for CatalogError {}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatalogError::duplicate_layer("public.buildings");
        let display = err.to_string();
        assert!(display.starts_with("[FATAL] GEOPLAN_DUPLICATE_LAYER"));
        assert!(display.contains("public.buildings"));
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = CatalogError::dimension_mismatch("public.lakes", 3, 2);
        assert_eq!(err.code(), CatalogErrorCode::DimensionMismatch);
        assert!(err.message().contains("dimension 2, expected 3"));
    }
}
