//! Offline layer index construction
//!
//! Each `(schema, table)` pair becomes one record:
//! - layer: `schema.table`
//! - description: `GIS layer named <table with '_' as spaces>`
//! - embedding: embedding of `"<layer>. <description>"`

use super::errors::{CatalogError, CatalogResult};
use super::types::LayerIndexEntry;
use crate::retrieval::EmbeddingProvider;

/// Builds index records through an embedding provider.
pub struct IndexBuilder<'a> {
    provider: &'a dyn EmbeddingProvider,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(provider: &'a dyn EmbeddingProvider) -> Self {
        Self { provider }
    }

    /// Embeds every table, in the given order. The first provider failure
    /// aborts the build; a partial index is never returned.
    pub fn build<S, T>(&self, tables: &[(S, T)]) -> CatalogResult<Vec<LayerIndexEntry>>
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        tables
            .iter()
            .map(|(schema, table)| self.build_entry(schema.as_ref(), table.as_ref()))
            .collect()
    }

    fn build_entry(&self, schema: &str, table: &str) -> CatalogResult<LayerIndexEntry> {
        let layer = format!("{}.{}", schema, table);
        let description = describe_table(table);
        let embedding = self
            .provider
            .embed(&format!("{}. {}", layer, description))
            .map_err(|e| CatalogError::build_failed(&layer, e.message()))?;
        Ok(LayerIndexEntry::new(layer, description, embedding))
    }
}

/// Default description for a table name
pub fn describe_table(table: &str) -> String {
    format!("GIS layer named {}", table.replace('_', " "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogErrorCode;
    use crate::retrieval::{RetrievalError, RetrievalResult};
    use std::sync::Mutex;

    struct RecordingProvider {
        seen: Mutex<Vec<String>>,
    }

    impl EmbeddingProvider for RecordingProvider {
        fn embed(&self, text: &str) -> RetrievalResult<Vec<f32>> {
            self.seen.lock().unwrap().push(text.to_string());
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    struct DownProvider;

    impl EmbeddingProvider for DownProvider {
        fn embed(&self, _text: &str) -> RetrievalResult<Vec<f32>> {
            Err(RetrievalError::unavailable("connection refused"))
        }
    }

    #[test]
    fn test_describe_table() {
        assert_eq!(
            describe_table("sykkelrute_senterlinje"),
            "GIS layer named sykkelrute senterlinje"
        );
    }

    #[test]
    fn test_build_embeds_layer_and_description() {
        let provider = RecordingProvider { seen: Mutex::new(Vec::new()) };
        let builder = IndexBuilder::new(&provider);

        let entries = builder
            .build(&[("public", "buildings"), ("public", "flomsoner_sample")])
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].layer, "public.buildings");
        assert_eq!(entries[1].description, "GIS layer named flomsoner sample");
        assert_eq!(
            provider.seen.lock().unwrap()[0],
            "public.buildings. GIS layer named buildings"
        );
    }

    #[test]
    fn test_provider_failure_aborts_build() {
        let builder = IndexBuilder::new(&DownProvider);
        let err = builder.build(&[("public", "buildings")]).unwrap_err();
        assert_eq!(err.code(), CatalogErrorCode::IndexBuildFailed);
        assert!(err.message().contains("public.buildings"));
    }
}
