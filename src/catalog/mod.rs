//! Layer catalog subsystem
//!
//! The catalog is the closed set of layers a plan may name. It is loaded
//! once from the persisted layer index and shared read-only (`Arc`) by the
//! validator and the retrieval index.

mod builder;
mod errors;
mod loader;
mod types;

pub use builder::{describe_table, IndexBuilder};
pub use errors::{CatalogError, CatalogErrorCode, CatalogResult};
pub use loader::LayerIndexLoader;
pub use types::{LayerCatalog, LayerIndexEntry};
