//! Layer index file loader
//!
//! The index is a single JSON array of `{layer, description, embedding}`
//! records. A missing or malformed index file is fatal at startup.

use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{CatalogError, CatalogResult};
use super::types::{LayerCatalog, LayerIndexEntry};
use crate::observability::{log_event_with_fields, Event};

/// Reads and writes the persisted layer index.
pub struct LayerIndexLoader {
    path: PathBuf,
}

impl LayerIndexLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the index into an immutable catalog
    pub fn load(&self, default_schema: &str) -> CatalogResult<LayerCatalog> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| CatalogError::unreadable(self.path.display(), e))?;

        let entries: Vec<LayerIndexEntry> = serde_json::from_str(&content)
            .map_err(|e| CatalogError::malformed(self.path.display(), format!("Invalid JSON: {}", e)))?;

        if let Some(pos) = entries.iter().position(|e| e.layer.trim().is_empty()) {
            return Err(CatalogError::malformed(
                self.path.display(),
                format!("record {} has an empty layer identifier", pos),
            ));
        }

        let catalog = LayerCatalog::new(entries, default_schema)?;

        let layers = catalog.len().to_string();
        let dimension = catalog
            .dimension()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "none".to_string());
        log_event_with_fields(
            Event::CatalogLoaded,
            &[
                ("dimension", dimension.as_str()),
                ("layers", layers.as_str()),
                ("path", &self.path.display().to_string()),
            ],
        );

        Ok(catalog)
    }

    /// Writes entries as a JSON array, replacing any existing file
    pub fn write(&self, entries: &[LayerIndexEntry]) -> CatalogResult<()> {
        let json = serde_json::to_string(entries)
            .map_err(|e| CatalogError::write_failed(self.path.display(), e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| CatalogError::write_failed(self.path.display(), e))?;
            }
        }
        fs::write(&self.path, json).map_err(|e| CatalogError::write_failed(self.path.display(), e))?;

        let layers = entries.len().to_string();
        log_event_with_fields(
            Event::CatalogWritten,
            &[
                ("layers", layers.as_str()),
                ("path", &self.path.display().to_string()),
            ],
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogErrorCode;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_load() {
        let dir = TempDir::new().unwrap();
        let loader = LayerIndexLoader::new(dir.path().join("embeddings").join("layer_index.json"));

        let entries = vec![
            LayerIndexEntry::new("public.buildings", "GIS layer named buildings", vec![0.5, 0.5]),
            LayerIndexEntry::new("public.flomsoner", "GIS layer named flomsoner", vec![1.0, 0.0]),
        ];
        loader.write(&entries).unwrap();

        let catalog = loader.load("public").unwrap();
        assert_eq!(catalog.entries(), entries.as_slice());
        assert!(catalog.contains("buildings"));
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let loader = LayerIndexLoader::new(dir.path().join("nope.json"));
        let err = loader.load("public").unwrap_err();
        assert_eq!(err.code(), CatalogErrorCode::IndexUnreadable);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("layer_index.json");
        fs::write(&path, "{\"layer\": \"not an array\"}").unwrap();

        let err = LayerIndexLoader::new(&path).load("public").unwrap_err();
        assert_eq!(err.code(), CatalogErrorCode::IndexMalformed);
    }

    #[test]
    fn test_empty_layer_name_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("layer_index.json");
        fs::write(&path, r#"[{"layer": " ", "description": "x", "embedding": []}]"#).unwrap();

        let err = LayerIndexLoader::new(&path).load("public").unwrap_err();
        assert_eq!(err.code(), CatalogErrorCode::IndexMalformed);
        assert!(err.message().contains("record 0"));
    }
}
