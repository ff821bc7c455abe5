//! Geographic containment subsystem
//!
//! Turns a municipality boundary (from the gazetteer) into a SQL predicate
//! restricting the primary layer's geometry. Everything here is pure except
//! the gazetteer seam.

mod boundary;
mod containment;
mod errors;
mod gazetteer;

pub use boundary::{
    multipolygon_to_bbox, BoundingBox, GeographicBoundary, MultiPolygon, Polygon, Position, Ring,
    LONLAT_SRID,
};
pub use containment::{
    bbox_clause, build_containment_clause, multipolygon_wkt, polygon_clause, TargetSrid,
};
pub use errors::{GeoError, GeoErrorCode, GeoResult};
pub use gazetteer::{CachedGazetteer, Gazetteer, StaticGazetteer};
