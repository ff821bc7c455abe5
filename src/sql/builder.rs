//! Deterministic SQL synthesis
//!
//! One statement per enriched plan, dispatched on the operation. Output is
//! a pure function of the plan and the options: the same input always
//! yields byte-identical SQL.
//!
//! Statement layout:
//!
//! ```text
//! SELECT a.*, ST_AsText(ST_Transform(a.geom, <srid>)) AS wkt_geom
//! FROM <schema>.<layer> a
//! [JOIN ... | CROSS JOIN ...]
//! [WHERE ...]
//! [ORDER BY ...]
//! [LIMIT n]
//! ```
//!
//! Join predicates lead with a bounding-box test (`&&`) so the planner can
//! use the spatial index before the exact predicate runs.

use super::errors::{SynthesisError, SynthesisResult};
use super::normalize::normalize_where_clause_with;
use super::options::SqlOptions;
use crate::plan::{is_layer_identifier, EnrichedPlan, Operation};

/// Renders `plan` as a single SQL statement without trailing semicolon.
///
/// # Errors
///
/// `SynthesisError` when the plan lacks something enrichment guarantees
/// (a target layer, a finite buffer distance, a positive SRID).
pub fn synthesize(plan: &EnrichedPlan, options: &SqlOptions) -> SynthesisResult<String> {
    if plan.layer.trim().is_empty() {
        return Err(SynthesisError::invalid_plan(plan.operation, "layer is empty"));
    }
    layer_identifier(plan, plan.layer.trim())?;
    if options.aliases_collide() {
        return Err(SynthesisError::invalid_plan(
            plan.operation,
            format!(
                "primary alias '{}' collides with target alias '{}'",
                options.primary_alias, options.target_alias
            ),
        ));
    }
    if plan.output_srid <= 0 {
        return Err(SynthesisError::invalid_plan(
            plan.operation,
            format!("output_srid {} is not positive", plan.output_srid),
        ));
    }

    match plan.operation {
        Operation::SelectLimitOnly => Ok(select_limit_only(plan, options)),
        Operation::SelectByAttribute => Ok(select_by_attribute(plan, options)),
        Operation::SelectBuffer => select_buffer(plan, options),
        Operation::SelectIntersect => select_join(plan, options, "ST_Intersects"),
        Operation::SelectNearest => select_nearest(plan, options),
        Operation::SelectWithin => select_join(plan, options, "ST_Within"),
        Operation::SelectOverlaps => select_join(plan, options, "ST_Overlaps"),
        Operation::SelectMultiTargetBuffer => select_multi_target_buffer(plan, options),
    }
}

/// Uses `identifier` as-is when it is already schema-qualified
pub fn qualify_identifier(identifier: &str, schema: &str) -> String {
    let identifier = identifier.trim();
    if identifier.contains('.') {
        identifier.to_string()
    } else {
        format!("{}.{}", schema, identifier)
    }
}

/// Accumulates clauses in statement order
struct Statement {
    lines: Vec<String>,
}

impl Statement {
    fn select_from(plan: &EnrichedPlan, options: &SqlOptions) -> Self {
        let a = &options.primary_alias;
        let projection = format!(
            "SELECT {a}.*, ST_AsText(ST_Transform({}, {})) AS {}",
            options.primary_geometry(),
            plan.output_srid,
            options.wkt_column,
        );
        let from = format!(
            "FROM {} {a}",
            qualify_identifier(&plan.layer, &options.schema)
        );
        Self {
            lines: vec![projection, from],
        }
    }

    fn line(mut self, line: String) -> Self {
        self.lines.push(line);
        self
    }

    fn limit(self, limit: Option<u64>) -> Self {
        match limit {
            Some(n) => self.line(format!("LIMIT {}", n)),
            None => self,
        }
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

fn where_clause(plan: &EnrichedPlan, options: &SqlOptions) -> String {
    normalize_where_clause_with(
        &plan.where_clause,
        &options.primary_alias,
        &options.geometry_column,
    )
}

fn is_trivial(clause: &str) -> bool {
    clause.eq_ignore_ascii_case("TRUE")
}

fn target_layer(plan: &EnrichedPlan) -> SynthesisResult<&str> {
    let target = plan
        .target_layer
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SynthesisError::invalid_plan(plan.operation, "target_layer is missing"))?;
    layer_identifier(plan, target)
}

/// Table names are spliced into the statement, so only `ident` or
/// `schema.ident` gets through
fn layer_identifier<'p>(plan: &EnrichedPlan, name: &'p str) -> SynthesisResult<&'p str> {
    if is_layer_identifier(name) {
        Ok(name)
    } else {
        Err(SynthesisError::invalid_plan(
            plan.operation,
            format!("'{}' is not a layer identifier", name),
        ))
    }
}

fn buffer_meters(plan: &EnrichedPlan) -> SynthesisResult<f64> {
    match plan.buffer_meters {
        Some(d) if d.is_finite() && d >= 0.0 => Ok(d),
        Some(d) => Err(SynthesisError::invalid_plan(
            plan.operation,
            format!("buffer_meters {} is not a finite distance >= 0", d),
        )),
        None => Err(SynthesisError::invalid_plan(plan.operation, "buffer_meters is missing")),
    }
}

/// The WHERE line is left out when nothing filters; a containment clause
/// is never dropped.
fn select_limit_only(plan: &EnrichedPlan, options: &SqlOptions) -> String {
    let clause = where_clause(plan, options);
    let statement = Statement::select_from(plan, options);
    let statement = if is_trivial(&clause) {
        statement
    } else {
        statement.line(format!("WHERE {}", clause))
    };
    statement.limit(plan.limit).finish()
}

fn select_by_attribute(plan: &EnrichedPlan, options: &SqlOptions) -> String {
    Statement::select_from(plan, options)
        .line(format!("WHERE {}", where_clause(plan, options)))
        .limit(plan.limit)
        .finish()
}

fn select_buffer(plan: &EnrichedPlan, options: &SqlOptions) -> SynthesisResult<String> {
    let target = qualify_identifier(target_layer(plan)?, &options.schema);
    let d = buffer_meters(plan)?;
    let a_geom = options.primary_geometry();
    let b = &options.target_alias;
    let b_geom = format!("{}.{}", b, options.geometry_column);

    Ok(Statement::select_from(plan, options)
        .line(format!(
            "JOIN {target} {b} ON {a_geom} && ST_Expand({b_geom}, {d}) AND ST_DWithin({a_geom}, {b_geom}, {d})"
        ))
        .line(format!("WHERE {}", where_clause(plan, options)))
        .limit(plan.limit)
        .finish())
}

/// Intersect, within and overlaps differ only in the exact predicate
fn select_join(plan: &EnrichedPlan, options: &SqlOptions, predicate: &str) -> SynthesisResult<String> {
    let target = qualify_identifier(target_layer(plan)?, &options.schema);
    let a_geom = options.primary_geometry();
    let b = &options.target_alias;
    let b_geom = format!("{}.{}", b, options.geometry_column);

    Ok(Statement::select_from(plan, options)
        .line(format!(
            "JOIN {target} {b} ON {a_geom} && {b_geom} AND {predicate}({a_geom}, {b_geom})"
        ))
        .line(format!("WHERE {}", where_clause(plan, options)))
        .limit(plan.limit)
        .finish())
}

fn select_nearest(plan: &EnrichedPlan, options: &SqlOptions) -> SynthesisResult<String> {
    let target = qualify_identifier(target_layer(plan)?, &options.schema);
    let a_geom = options.primary_geometry();
    let b = &options.target_alias;

    let mut order_by = format!("ORDER BY {a_geom} <-> {b}.{} ASC", options.geometry_column);
    if let Some(column) = &options.nearest_tiebreak {
        order_by.push_str(&format!(", {}.{} ASC", options.primary_alias, column));
    }

    Ok(Statement::select_from(plan, options)
        .line(format!("CROSS JOIN {target} {b}"))
        .line(format!("WHERE {}", where_clause(plan, options)))
        .line(order_by)
        .limit(plan.limit)
        .finish())
}

/// One `EXISTS` conjunct per target, aliased `b1..bn` in list order
fn select_multi_target_buffer(plan: &EnrichedPlan, options: &SqlOptions) -> SynthesisResult<String> {
    let targets = match plan.target_layers.as_deref() {
        Some(t) if !t.is_empty() => t,
        _ => {
            return Err(SynthesisError::invalid_plan(
                plan.operation,
                "target_layers is missing or empty",
            ))
        }
    };
    let d = buffer_meters(plan)?;
    let a_geom = options.primary_geometry();

    let mut conjuncts = vec![format!("({})", where_clause(plan, options))];
    for (i, target) in targets.iter().enumerate() {
        if target.trim().is_empty() {
            return Err(SynthesisError::invalid_plan(
                plan.operation,
                format!("target_layers[{}] is empty", i),
            ));
        }
        let target = layer_identifier(plan, target.trim())?;
        let alias = format!("{}{}", options.target_alias, i + 1);
        let geom = format!("{}.{}", alias, options.geometry_column);
        conjuncts.push(format!(
            "EXISTS (SELECT 1 FROM {} {alias} WHERE {a_geom} && ST_Expand({geom}, {d}) AND ST_DWithin({a_geom}, {geom}, {d}))",
            qualify_identifier(target, &options.schema),
        ));
    }

    Ok(Statement::select_from(plan, options)
        .line(format!("WHERE {}", conjuncts.join(" AND ")))
        .limit(plan.limit)
        .finish())
}
