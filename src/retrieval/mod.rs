//! Layer retrieval subsystem
//!
//! Answers "which layers are most relevant to this text" by cosine
//! similarity between a query embedding and the precomputed embeddings in
//! the layer catalog.
//!
//! # Guarantees
//!
//! - Results are sorted by descending score, ties in catalog order
//! - At most `k` results; exactly `min(k, catalog size)` without a score floor
//! - Provider failures surface as `GEOPLAN_RETRIEVAL_UNAVAILABLE`

mod embedder;
mod errors;
mod index;
mod similarity;

pub use embedder::{EmbeddingProvider, PrecomputedEmbedding};
pub use errors::{RetrievalError, RetrievalErrorCode, RetrievalResult};
pub use index::{format_layer_context, rank_entries, LayerRetrievalIndex, ScoredLayer};
pub use similarity::{cosine_similarity, SIMILARITY_SENTINEL};
