//! `where_clause` normalization
//!
//! Author clauses name the geometry column bare (`ST_Area(geom) > 100`),
//! but every generated statement joins at least one other table with the
//! same column. Bare mentions are therefore qualified with the primary
//! alias.
//!
//! The clause is scanned token by token so that quoted literals, quoted
//! identifiers and dotted names are skipped as units. Already qualified
//! names are never touched, which makes the rewrite idempotent.

use std::sync::OnceLock;

use regex::Regex;

/// String literal | quoted identifier | dotted name | bare word
const TOKEN_PATTERN: &str = r#"'(?:[^']|'')*'|"(?:[^"]|"")*"|[A-Za-z0-9_]+(?:\s*\.\s*[A-Za-z0-9_]+)+|[A-Za-z0-9_]+"#;

fn token_pattern() -> &'static Regex {
    static TOKENS: OnceLock<Regex> = OnceLock::new();
    TOKENS.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is a valid regex"))
}

/// Normalizes with the default alias `a` and column `geom`
pub fn normalize_where_clause(clause: &str) -> String {
    normalize_where_clause_with(clause, "a", "geom")
}

/// Qualifies bare, case-insensitive mentions of `geometry_column` as
/// `<alias>.<geometry_column>`. Blank input becomes `TRUE`.
pub fn normalize_where_clause_with(clause: &str, alias: &str, geometry_column: &str) -> String {
    let clause = clause.trim();
    if clause.is_empty() {
        return "TRUE".to_string();
    }

    let mut out = String::with_capacity(clause.len() + 8);
    let mut last = 0;
    for token in token_pattern().find_iter(clause) {
        if !token.as_str().eq_ignore_ascii_case(geometry_column) {
            continue;
        }
        // `"t".geom`: the qualifier was a quoted identifier
        if clause[..token.start()].trim_end().ends_with('.') {
            continue;
        }
        out.push_str(&clause[last..token.start()]);
        out.push_str(alias);
        out.push('.');
        out.push_str(geometry_column);
        last = token.end();
    }
    out.push_str(&clause[last..]);
    out
}
