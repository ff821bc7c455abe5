//! # Structured filter expressions
//!
//! A typed alternative to free-text `where_clause` fragments. Fields are
//! plain identifiers qualified with the primary alias; values are JSON
//! scalars rendered as SQL literals.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{PlanError, PlanResult};

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Pattern match (LIKE)
    Like,
    /// Value in list
    In,
    /// IS NULL / IS NOT NULL
    Is,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Like => "like",
            FilterOperator::In => "in",
            FilterOperator::Is => "is",
        }
    }

    fn sql_comparison(&self) -> Option<&'static str> {
        match self {
            FilterOperator::Eq => Some("="),
            FilterOperator::Neq => Some("<>"),
            FilterOperator::Gt => Some(">"),
            FilterOperator::Gte => Some(">="),
            FilterOperator::Lt => Some("<"),
            FilterOperator::Lte => Some("<="),
            FilterOperator::Like => Some("LIKE"),
            FilterOperator::In | FilterOperator::Is => None,
        }
    }
}

/// A filter expression `{field, op, value}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterExpr {
    pub field: String,
    pub op: FilterOperator,
    #[serde(default)]
    pub value: Value,
}

impl FilterExpr {
    pub fn new(field: impl Into<String>, op: FilterOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOperator::Gt, value)
    }

    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, FilterOperator::In, Value::Array(values))
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Is, Value::Null)
    }

    /// Renders the predicate against `alias`.
    ///
    /// `position` names the filter in errors (`filters[i]`).
    pub fn render(&self, alias: &str, position: usize) -> PlanResult<String> {
        let name = format!("filters[{}]", position);
        if !is_identifier(&self.field) {
            return Err(PlanError::invalid_filter(
                name,
                format!("Filter field '{}' is not a plain identifier", self.field),
            ));
        }
        let column = format!("{}.{}", alias, self.field);

        match self.op {
            FilterOperator::In => {
                let values = match &self.value {
                    Value::Array(values) if !values.is_empty() => values,
                    _ => {
                        return Err(PlanError::invalid_filter(
                            name,
                            "Operator 'in' needs a non-empty array",
                        ))
                    }
                };
                let literals = values
                    .iter()
                    .map(|v| literal(v).ok_or_else(|| not_scalar(&name, self.op, v)))
                    .collect::<PlanResult<Vec<_>>>()?;
                Ok(format!("{} IN ({})", column, literals.join(", ")))
            }
            FilterOperator::Is => match &self.value {
                Value::Null => Ok(format!("{} IS NULL", column)),
                Value::String(s) if s.eq_ignore_ascii_case("null") => {
                    Ok(format!("{} IS NULL", column))
                }
                Value::String(s)
                    if s.eq_ignore_ascii_case("not_null") || s.eq_ignore_ascii_case("not null") =>
                {
                    Ok(format!("{} IS NOT NULL", column))
                }
                other => Err(PlanError::invalid_filter(
                    name,
                    format!("Operator 'is' takes null or \"not_null\", got {}", other),
                )),
            },
            FilterOperator::Like => match &self.value {
                Value::String(pattern) => {
                    Ok(format!("{} LIKE '{}'", column, pattern.replace('\'', "''")))
                }
                other => Err(PlanError::invalid_filter(
                    name,
                    format!("Operator 'like' needs a string pattern, got {}", other),
                )),
            },
            op => {
                let value = literal(&self.value).ok_or_else(|| not_scalar(&name, op, &self.value))?;
                // sql_comparison is Some for every remaining operator
                let cmp = op.sql_comparison().unwrap_or("=");
                Ok(format!("{} {} {}", column, cmp, value))
            }
        }
    }
}

/// Renders all filters AND-ed together; `None` when there are none
pub fn render_filters(filters: &[FilterExpr], alias: &str) -> PlanResult<Option<String>> {
    if filters.is_empty() {
        return Ok(None);
    }
    let parts = filters
        .iter()
        .enumerate()
        .map(|(i, f)| f.render(alias, i))
        .collect::<PlanResult<Vec<_>>>()?;
    Ok(Some(parts.join(" AND ")))
}

fn not_scalar(name: &str, op: FilterOperator, value: &Value) -> PlanError {
    PlanError::invalid_filter(
        name,
        format!(
            "Operator '{}' needs a string, number or boolean, got {}",
            op.as_str(),
            value
        ),
    )
}

/// SQL literal for a JSON scalar; `None` for null, arrays and objects
fn literal(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(format!("'{}'", s.replace('\'', "''"))),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("TRUE".to_string()),
        Value::Bool(false) => Some("FALSE".to_string()),
        _ => None,
    }
}

/// `table` or `schema.table`, each part a plain identifier
pub fn is_layer_identifier(name: &str) -> bool {
    match name.split_once('.') {
        Some((schema, table)) => is_identifier(schema) && is_identifier(table),
        None => is_identifier(name),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlanErrorCode;
    use serde_json::json;

    #[test]
    fn test_comparisons() {
        assert_eq!(
            FilterExpr::gt("height", json!(20)).render("a", 0).unwrap(),
            "a.height > 20"
        );
        assert_eq!(
            FilterExpr::new("kind", FilterOperator::Neq, json!("shed")).render("a", 0).unwrap(),
            "a.kind <> 'shed'"
        );
        assert_eq!(
            FilterExpr::eq("listed", json!(true)).render("a", 0).unwrap(),
            "a.listed = TRUE"
        );
    }

    #[test]
    fn test_string_quotes_escaped() {
        assert_eq!(
            FilterExpr::eq("name", json!("O'Hara's")).render("a", 0).unwrap(),
            "a.name = 'O''Hara''s'"
        );
    }

    #[test]
    fn test_in_and_is() {
        assert_eq!(
            FilterExpr::in_list("zone", vec![json!("H1"), json!(3)]).render("a", 0).unwrap(),
            "a.zone IN ('H1', 3)"
        );
        assert_eq!(FilterExpr::is_null("owner").render("a", 0).unwrap(), "a.owner IS NULL");
        assert_eq!(
            FilterExpr::new("owner", FilterOperator::Is, json!("not_null")).render("a", 0).unwrap(),
            "a.owner IS NOT NULL"
        );
    }

    #[test]
    fn test_like() {
        assert_eq!(
            FilterExpr::new("name", FilterOperator::Like, json!("Stor%")).render("a", 0).unwrap(),
            "a.name LIKE 'Stor%'"
        );
    }

    #[test]
    fn test_rejects_injection_in_field() {
        let err = FilterExpr::eq("x = 1 OR 1", json!(1)).render("a", 2).unwrap_err();
        assert_eq!(err.code(), PlanErrorCode::InvalidFilter);
        assert_eq!(err.field(), "filters[2]");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(FilterExpr::eq("x", json!(null)).render("a", 0).is_err());
        assert!(FilterExpr::in_list("x", vec![]).render("a", 0).is_err());
        assert!(FilterExpr::in_list("x", vec![json!([1])]).render("a", 0).is_err());
        assert!(FilterExpr::new("x", FilterOperator::Like, json!(5)).render("a", 0).is_err());
    }

    #[test]
    fn test_render_filters_joins_with_and() {
        let filters = vec![FilterExpr::gt("height", json!(20)), FilterExpr::is_null("owner")];
        assert_eq!(
            render_filters(&filters, "a").unwrap().unwrap(),
            "a.height > 20 AND a.owner IS NULL"
        );
        assert_eq!(render_filters(&[], "a").unwrap(), None);
    }

    #[test]
    fn test_deserialize() {
        let f: FilterExpr =
            serde_json::from_value(json!({"field": "zone", "op": "in", "value": ["H1"]})).unwrap();
        assert_eq!(f.op, FilterOperator::In);
    }
}
