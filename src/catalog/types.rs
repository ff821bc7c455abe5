//! Layer catalog types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::errors::{CatalogError, CatalogResult};

/// One record of the persisted layer index.
///
/// Built offline and never mutated while serving requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerIndexEntry {
    /// Layer identifier, usually `schema.table`
    pub layer: String,
    /// Human-readable description
    pub description: String,
    /// Precomputed embedding of `"<layer>. <description>"`
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl LayerIndexEntry {
    pub fn new(
        layer: impl Into<String>,
        description: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            layer: layer.into(),
            description: description.into(),
            embedding,
        }
    }
}

/// The closed set of known layers.
///
/// Entries keep their file order, which is also the tie-break order for
/// retrieval. Lookups accept both `buildings` and `public.buildings` when
/// `public` is the default schema.
#[derive(Debug, Clone)]
pub struct LayerCatalog {
    entries: Vec<LayerIndexEntry>,
    by_name: HashMap<String, usize>,
    default_schema: String,
    dimension: Option<usize>,
}

impl LayerCatalog {
    /// Builds a catalog, rejecting duplicate layers and mixed embedding
    /// dimensions. Entries without an embedding are allowed; they only
    /// take part in validation.
    pub fn new(
        entries: Vec<LayerIndexEntry>,
        default_schema: impl Into<String>,
    ) -> CatalogResult<Self> {
        let default_schema = default_schema.into();
        let mut by_name = HashMap::with_capacity(entries.len());
        let mut dimension: Option<usize> = None;

        for (pos, entry) in entries.iter().enumerate() {
            let key = canonical_name(&entry.layer, &default_schema);
            if by_name.insert(key, pos).is_some() {
                return Err(CatalogError::duplicate_layer(&entry.layer));
            }

            if entry.embedding.is_empty() {
                continue;
            }
            match dimension {
                None => dimension = Some(entry.embedding.len()),
                Some(expected) if expected != entry.embedding.len() => {
                    return Err(CatalogError::dimension_mismatch(
                        &entry.layer,
                        expected,
                        entry.embedding.len(),
                    ));
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            entries,
            by_name,
            default_schema,
            dimension,
        })
    }

    /// Builds a catalog of description-only entries (no embeddings)
    pub fn from_descriptions<I, L, D>(layers: I, default_schema: &str) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = (L, D)>,
        L: Into<String>,
        D: Into<String>,
    {
        let entries = layers
            .into_iter()
            .map(|(layer, description)| LayerIndexEntry::new(layer, description, Vec::new()))
            .collect();
        Self::new(entries, default_schema)
    }

    /// Looks a layer up by bare or schema-qualified name
    pub fn resolve(&self, layer: &str) -> Option<&LayerIndexEntry> {
        let key = canonical_name(layer.trim(), &self.default_schema);
        self.by_name.get(&key).map(|&pos| &self.entries[pos])
    }

    /// Checks if a layer is known
    pub fn contains(&self, layer: &str) -> bool {
        self.resolve(layer).is_some()
    }

    /// The first `n` layer identifiers, in catalog order
    pub fn sample(&self, n: usize) -> Vec<&str> {
        self.entries.iter().take(n).map(|e| e.layer.as_str()).collect()
    }

    /// All entries in catalog order
    pub fn entries(&self) -> &[LayerIndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    /// Shared embedding dimension, if any entry carries an embedding
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

fn canonical_name(layer: &str, default_schema: &str) -> String {
    if layer.contains('.') {
        layer.to_string()
    } else {
        format!("{}.{}", default_schema, layer)
    }
}
