//! Naming conventions applied to generated SQL

/// Schema, aliases and column names the synthesizer emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlOptions {
    /// Schema prefixed to unqualified layer names
    pub schema: String,
    /// Alias of the primary table
    pub primary_alias: String,
    /// Alias of the single target table; multi-target uses `<alias>1..n`
    pub target_alias: String,
    pub geometry_column: String,
    /// Name of the WKT projection column
    pub wkt_column: String,
    /// Secondary `ORDER BY` key for `select_nearest`
    pub nearest_tiebreak: Option<String>,
}

impl Default for SqlOptions {
    fn default() -> Self {
        Self {
            schema: "public".to_string(),
            primary_alias: "a".to_string(),
            target_alias: "b".to_string(),
            geometry_column: "geom".to_string(),
            wkt_column: "wkt_geom".to_string(),
            nearest_tiebreak: None,
        }
    }
}

impl SqlOptions {
    /// `a.geom`
    pub fn primary_geometry(&self) -> String {
        format!("{}.{}", self.primary_alias, self.geometry_column)
    }

    /// True when the primary alias equals the target alias or one of the
    /// numbered multi-target aliases. Unquoted identifiers are case-folded,
    /// so `B` and `b2` both collide with `b`.
    pub fn aliases_collide(&self) -> bool {
        let primary = self.primary_alias.to_ascii_lowercase();
        match primary.strip_prefix(&self.target_alias.to_ascii_lowercase()) {
            Some(suffix) => suffix.chars().all(|c| c.is_ascii_digit()),
            None => false,
        }
    }

    pub fn with_nearest_tiebreak(mut self, column: impl Into<String>) -> Self {
        self.nearest_tiebreak = Some(column.into());
        self
    }
}
