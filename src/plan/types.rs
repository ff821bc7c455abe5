//! Plan types
//!
//! A `CandidatePlan` is what intent extraction hands over: loosely typed,
//! possibly incomplete. An `EnrichedPlan` has passed validation, carries
//! every default and is the only input the SQL synthesizer accepts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::filter::FilterExpr;

/// The closed set of spatial query operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Rows of the primary layer, no filter beyond containment
    SelectLimitOnly,
    /// Rows matching an attribute filter
    SelectByAttribute,
    /// Rows within a distance of any target feature
    SelectBuffer,
    /// Rows intersecting a target feature
    SelectIntersect,
    /// Rows ordered by distance to target features
    SelectNearest,
    /// Rows contained in a target feature
    SelectWithin,
    /// Rows overlapping a target feature
    SelectOverlaps,
    /// Rows within a distance of a feature in every target layer
    SelectMultiTargetBuffer,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::SelectLimitOnly,
        Operation::SelectByAttribute,
        Operation::SelectBuffer,
        Operation::SelectIntersect,
        Operation::SelectNearest,
        Operation::SelectWithin,
        Operation::SelectOverlaps,
        Operation::SelectMultiTargetBuffer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::SelectLimitOnly => "select_limit_only",
            Operation::SelectByAttribute => "select_by_attribute",
            Operation::SelectBuffer => "select_buffer",
            Operation::SelectIntersect => "select_intersect",
            Operation::SelectNearest => "select_nearest",
            Operation::SelectWithin => "select_within",
            Operation::SelectOverlaps => "select_overlaps",
            Operation::SelectMultiTargetBuffer => "select_multi_target_buffer",
        }
    }

    /// Operations that carry a buffer distance
    pub fn is_buffer_class(&self) -> bool {
        matches!(self, Operation::SelectBuffer | Operation::SelectMultiTargetBuffer)
    }

    /// Join-based operations against a single target layer
    pub fn requires_target_layer(&self) -> bool {
        matches!(
            self,
            Operation::SelectBuffer
                | Operation::SelectIntersect
                | Operation::SelectNearest
                | Operation::SelectWithin
                | Operation::SelectOverlaps
        )
    }

    pub fn requires_target_layers(&self) -> bool {
        matches!(self, Operation::SelectMultiTargetBuffer)
    }

    /// Names of all operations, for error messages
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Operation::as_str).collect()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s.trim())
            .ok_or_else(|| s.to_string())
    }
}

/// A plan as emitted by intent extraction, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidatePlan {
    pub operation: String,
    pub layer: Option<String>,
    pub target_layer: Option<String>,
    pub target_layers: Option<Vec<String>>,
    pub where_clause: Option<String>,
    /// Structured filters, AND-ed with `where_clause`
    pub filters: Option<Vec<FilterExpr>>,
    pub buffer_meters: Option<f64>,
    /// Kept as a raw JSON number so `-1` and `2.5` can be rejected by name
    pub limit: Option<serde_json::Number>,
    pub output_srid: Option<i64>,
}

impl CandidatePlan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            ..Self::default()
        }
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn with_target_layer(mut self, layer: impl Into<String>) -> Self {
        self.target_layer = Some(layer.into());
        self
    }

    pub fn with_target_layers<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_layers = Some(layers.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_where(mut self, clause: impl Into<String>) -> Self {
        self.where_clause = Some(clause.into());
        self
    }

    pub fn with_filter(mut self, filter: FilterExpr) -> Self {
        self.filters.get_or_insert_with(Vec::new).push(filter);
        self
    }

    pub fn with_buffer_meters(mut self, meters: f64) -> Self {
        self.buffer_meters = Some(meters);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit.into());
        self
    }

    pub fn with_output_srid(mut self, srid: i64) -> Self {
        self.output_srid = Some(srid);
        self
    }
}

/// A validated plan with all defaults applied.
///
/// `where_clause` is the final combined clause (author clause, structured
/// filters and containment) and is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedPlan {
    pub operation: Operation,
    pub layer: String,
    pub target_layer: Option<String>,
    pub target_layers: Option<Vec<String>>,
    pub where_clause: String,
    /// Present exactly for buffer-class operations
    pub buffer_meters: Option<f64>,
    /// Always `Some` after enrichment; `None` only in hand-built plans
    pub limit: Option<u64>,
    pub output_srid: i64,
}
