//! Top-k layer retrieval by cosine similarity
//!
//! Retrieval is advisory: it produces context for intent extraction and
//! never decides the `layer` of a plan.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;

use super::embedder::EmbeddingProvider;
use super::errors::RetrievalResult;
use super::similarity::cosine_similarity;
use crate::catalog::LayerCatalog;

/// A catalog entry scored against a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredLayer {
    pub score: f64,
    pub layer: String,
    pub description: String,
}

/// Nearest-neighbour search over the catalog's stored embeddings.
pub struct LayerRetrievalIndex {
    catalog: Arc<LayerCatalog>,
    provider: Arc<dyn EmbeddingProvider>,
    min_score: Option<f64>,
}

impl LayerRetrievalIndex {
    pub fn new(catalog: Arc<LayerCatalog>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            catalog,
            provider,
            min_score: None,
        }
    }

    /// Drop results scoring below `min_score`
    pub fn with_min_score(mut self, min_score: Option<f64>) -> Self {
        self.min_score = min_score;
        self
    }

    /// Embeds `text` and returns at most `k` layers, best first.
    ///
    /// Blank text is not sent to the provider; every entry then scores the
    /// sentinel and the result is the first `k` entries in catalog order.
    pub fn retrieve_top_layers(&self, text: &str, k: usize) -> RetrievalResult<Vec<ScoredLayer>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let query = if text.trim().is_empty() {
            Vec::new()
        } else {
            self.provider.embed(text.trim())?
        };
        Ok(self.rank(&query, k))
    }

    /// Ranks the catalog against an already computed query vector
    pub fn rank(&self, query: &[f32], k: usize) -> Vec<ScoredLayer> {
        rank_entries(&self.catalog, query, k, self.min_score)
    }

    pub fn catalog(&self) -> &LayerCatalog {
        &self.catalog
    }
}

/// Scores every entry, sorts descending (stable on ties, so catalog order
/// breaks them) and keeps the first `k`.
pub fn rank_entries(
    catalog: &LayerCatalog,
    query: &[f32],
    k: usize,
    min_score: Option<f64>,
) -> Vec<ScoredLayer> {
    if k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<ScoredLayer> = catalog
        .entries()
        .iter()
        .map(|entry| ScoredLayer {
            score: cosine_similarity(query, &entry.embedding),
            layer: entry.layer.clone(),
            description: entry.description.clone(),
        })
        .filter(|s| min_score.map_or(true, |min| s.score >= min))
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(k);
    scored
}

/// Renders retrieval results as the context block handed to intent
/// extraction.
pub fn format_layer_context(top_layers: &[ScoredLayer]) -> String {
    let mut lines = Vec::with_capacity(top_layers.len() + 1);
    lines.push("AVAILABLE LAYERS (most relevant):".to_string());
    for scored in top_layers {
        lines.push(format!("- {}: {}", scored.layer, scored.description));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LayerIndexEntry;
    use crate::retrieval::{PrecomputedEmbedding, RetrievalError, RetrievalErrorCode};

    fn catalog() -> Arc<LayerCatalog> {
        Arc::new(
            LayerCatalog::new(
                vec![
                    LayerIndexEntry::new("public.buildings", "GIS layer named buildings", vec![1.0, 0.0, 0.0]),
                    LayerIndexEntry::new("public.flomsoner", "GIS layer named flomsoner", vec![0.0, 1.0, 0.0]),
                    LayerIndexEntry::new("public.rivers", "GIS layer named rivers", vec![0.0, 0.9, 0.1]),
                    LayerIndexEntry::new("public.lakes", "GIS layer named lakes", vec![0.0, 1.0, 0.0]),
                ],
                "public",
            )
            .unwrap(),
        )
    }

    fn index(query: Vec<f32>) -> LayerRetrievalIndex {
        LayerRetrievalIndex::new(catalog(), Arc::new(PrecomputedEmbedding::new(query)))
    }

    struct DownProvider;

    impl EmbeddingProvider for DownProvider {
        fn embed(&self, _text: &str) -> RetrievalResult<Vec<f32>> {
            Err(RetrievalError::unavailable("connection refused"))
        }
    }

    #[test]
    fn test_best_match_first() {
        let top = index(vec![0.0, 1.0, 0.0]).retrieve_top_layers("flood zones", 2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].layer, "public.flomsoner");
        assert!((top[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let top = index(vec![0.0, 1.0, 0.0]).retrieve_top_layers("water", 4).unwrap();
        assert_eq!(top[0].layer, "public.flomsoner");
        assert_eq!(top[1].layer, "public.lakes");
        assert_eq!(top[2].layer, "public.rivers");
        assert_eq!(top[3].layer, "public.buildings");
    }

    #[test]
    fn test_length_is_min_of_k_and_catalog() {
        let idx = index(vec![1.0, 1.0, 1.0]);
        assert_eq!(idx.retrieve_top_layers("x", 0).unwrap().len(), 0);
        assert_eq!(idx.retrieve_top_layers("x", 3).unwrap().len(), 3);
        assert_eq!(idx.retrieve_top_layers("x", 50).unwrap().len(), 4);
    }

    #[test]
    fn test_sorted_descending() {
        let top = index(vec![0.2, 0.7, 0.4]).retrieve_top_layers("x", 10).unwrap();
        for pair in top.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_blank_text_scores_sentinel_in_catalog_order() {
        let top = LayerRetrievalIndex::new(catalog(), Arc::new(DownProvider))
            .retrieve_top_layers("   ", 2)
            .unwrap();
        assert_eq!(top[0].layer, "public.buildings");
        assert_eq!(top[0].score, -1.0);
    }

    #[test]
    fn test_provider_failure_is_unavailable() {
        let err = LayerRetrievalIndex::new(catalog(), Arc::new(DownProvider))
            .retrieve_top_layers("buildings near rivers", 3)
            .unwrap_err();
        assert_eq!(err.code(), RetrievalErrorCode::RetrievalUnavailable);
    }

    #[test]
    fn test_min_score_filters() {
        let top = index(vec![1.0, 0.0, 0.0])
            .with_min_score(Some(0.5))
            .retrieve_top_layers("houses", 5)
            .unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].layer, "public.buildings");
    }

    #[test]
    fn test_format_layer_context() {
        let top = index(vec![1.0, 0.0, 0.0]).retrieve_top_layers("houses", 2).unwrap();
        let context = format_layer_context(&top);
        let lines: Vec<_> = context.lines().collect();
        assert_eq!(lines[0], "AVAILABLE LAYERS (most relevant):");
        assert_eq!(lines[1], "- public.buildings: GIS layer named buildings");
        assert_eq!(lines.len(), 3);
    }
}
