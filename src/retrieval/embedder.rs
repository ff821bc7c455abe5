//! Embedding provider seam
//!
//! Computing embeddings is an external service. Implementations make a
//! blocking call with their own timeout and report any failure as
//! `RetrievalError::unavailable`.

use super::errors::RetrievalResult;

/// Turns text into an embedding vector.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text. Implementations should return an empty vector
    /// for blank input rather than calling the remote service.
    fn embed(&self, text: &str) -> RetrievalResult<Vec<f32>>;
}

/// Provider that always returns one fixed vector.
///
/// Used when the query vector was computed elsewhere (for example, passed
/// to the CLI), so ranking can run without a live service.
#[derive(Debug, Clone)]
pub struct PrecomputedEmbedding {
    vector: Vec<f32>,
}

impl PrecomputedEmbedding {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

impl EmbeddingProvider for PrecomputedEmbedding {
    fn embed(&self, _text: &str) -> RetrievalResult<Vec<f32>> {
        Ok(self.vector.clone())
    }
}
