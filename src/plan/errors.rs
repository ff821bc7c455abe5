//! Plan validation error types
//!
//! Error codes:
//! - GEOPLAN_UNSUPPORTED_OPERATION (REJECT)
//! - GEOPLAN_UNKNOWN_LAYER (REJECT)
//! - GEOPLAN_MISSING_TARGET_LAYER (REJECT)
//! - GEOPLAN_MISSING_TARGET_LAYERS (REJECT)
//! - GEOPLAN_INVALID_BUFFER_DISTANCE (REJECT)
//! - GEOPLAN_INVALID_LIMIT (REJECT)
//! - GEOPLAN_INVALID_OUTPUT_SRID (REJECT)
//! - GEOPLAN_INVALID_FILTER (REJECT)
//!
//! Every error names the offending field and, where one exists, the value.

use std::fmt;

use crate::error::Severity;

/// Plan validation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanErrorCode {
    /// Operation outside the closed set
    UnsupportedOperation,
    /// Layer missing or not in the catalog
    UnknownLayer,
    /// Join-based operation without a target layer
    MissingTargetLayer,
    /// Multi-target buffer without target layers
    MissingTargetLayers,
    /// Buffer distance negative or not finite
    InvalidBufferDistance,
    /// Limit not a non-negative integer
    InvalidLimit,
    /// Output SRID not positive
    InvalidOutputSrid,
    /// Structured filter cannot be rendered
    InvalidFilter,
}

impl PlanErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            PlanErrorCode::UnsupportedOperation => "GEOPLAN_UNSUPPORTED_OPERATION",
            PlanErrorCode::UnknownLayer => "GEOPLAN_UNKNOWN_LAYER",
            PlanErrorCode::MissingTargetLayer => "GEOPLAN_MISSING_TARGET_LAYER",
            PlanErrorCode::MissingTargetLayers => "GEOPLAN_MISSING_TARGET_LAYERS",
            PlanErrorCode::InvalidBufferDistance => "GEOPLAN_INVALID_BUFFER_DISTANCE",
            PlanErrorCode::InvalidLimit => "GEOPLAN_INVALID_LIMIT",
            PlanErrorCode::InvalidOutputSrid => "GEOPLAN_INVALID_OUTPUT_SRID",
            PlanErrorCode::InvalidFilter => "GEOPLAN_INVALID_FILTER",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PlanErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Plan validation error with full context
#[derive(Debug, Clone)]
pub struct PlanError {
    code: PlanErrorCode,
    message: String,
    /// Offending plan field, e.g. `target_layers[1]`
    field: String,
    /// Offending value as the caller supplied it
    value: Option<String>,
}

impl PlanError {
    fn new(
        code: PlanErrorCode,
        field: impl Into<String>,
        value: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            field: field.into(),
            value,
        }
    }

    pub fn unsupported_operation(operation: &str, supported: &[&str]) -> Self {
        Self::new(
            PlanErrorCode::UnsupportedOperation,
            "operation",
            Some(operation.to_string()),
            format!(
                "Unsupported operation '{}'. Supported operations: {}",
                operation,
                supported.join(", ")
            ),
        )
    }

    /// `sample` is a bounded list of valid identifiers shown to the caller
    pub fn unknown_layer(field: impl Into<String>, layer: Option<&str>, sample: &[&str]) -> Self {
        let shown = match layer {
            Some(l) => format!("'{}'", l),
            None => "<missing>".to_string(),
        };
        Self::new(
            PlanErrorCode::UnknownLayer,
            field,
            layer.map(str::to_string),
            format!(
                "Unknown layer {}. Valid layers include: {}",
                shown,
                sample.join(", ")
            ),
        )
    }

    /// A target name that cannot be used as a table reference
    pub fn invalid_layer_identifier(field: impl Into<String>, layer: &str) -> Self {
        Self::new(
            PlanErrorCode::UnknownLayer,
            field,
            Some(layer.to_string()),
            format!("'{}' is not a layer identifier (expected table or schema.table)", layer),
        )
    }

    pub fn missing_target_layer(operation: &str) -> Self {
        Self::new(
            PlanErrorCode::MissingTargetLayer,
            "target_layer",
            None,
            format!("Operation '{}' requires a non-empty target_layer", operation),
        )
    }

    /// `field` is `target_layers` or `target_layers[i]` for a blank element
    pub fn missing_target_layers(field: impl Into<String>, value: Option<String>) -> Self {
        let field = field.into();
        let message = match &value {
            Some(_) => format!("Element {} of target_layers is empty", field),
            None => "Operation 'select_multi_target_buffer' requires a non-empty target_layers list"
                .to_string(),
        };
        Self::new(PlanErrorCode::MissingTargetLayers, field, value, message)
    }

    pub fn invalid_buffer_distance(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(
            PlanErrorCode::InvalidBufferDistance,
            "buffer_meters",
            Some(value.clone()),
            format!("buffer_meters must be a finite number >= 0, got {}", value),
        )
    }

    pub fn invalid_limit(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(
            PlanErrorCode::InvalidLimit,
            "limit",
            Some(value.clone()),
            format!("limit must be a non-negative integer, got {}", value),
        )
    }

    pub fn invalid_output_srid(value: i64) -> Self {
        Self::new(
            PlanErrorCode::InvalidOutputSrid,
            "output_srid",
            Some(value.to_string()),
            format!("output_srid must be a positive SRID, got {}", value),
        )
    }

    pub fn invalid_filter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(PlanErrorCode::InvalidFilter, field, None, reason)
    }

    pub fn code(&self) -> PlanErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} (field: {})",
            self.code.severity(),
            self.code.code(),
            self.message,
            self.field
        )
    }
}

impl std::error::Error for PlanError {}

/// Result type for plan validation
pub type PlanResult<T> = Result<T, PlanError>;
