//! Containment predicates restricting the primary geometry to a boundary
//!
//! Two shapes, chosen by what the gazetteer returned:
//! - bbox: envelope overlap (`&&`) with the reprojected rectangle
//! - polygon: exact `ST_Intersects` with the reprojected rings
//!
//! Polygon mode is preferred: a municipality's rectangle usually covers
//! parts of its neighbours.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use super::boundary::{BoundingBox, GeographicBoundary, MultiPolygon, Position, LONLAT_SRID};
use super::errors::{GeoError, GeoResult};

/// Spatial reference the boundary is reprojected into before comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSrid {
    /// Whatever SRID the primary geometry column carries (`ST_SRID(...)`)
    #[default]
    OfGeometry,
    /// A fixed, known SRID
    Fixed(i32),
}

impl TargetSrid {
    /// SQL expression for the SRID
    pub fn render(&self, geometry: &str) -> String {
        match self {
            TargetSrid::OfGeometry => format!("ST_SRID({})", geometry),
            TargetSrid::Fixed(srid) => srid.to_string(),
        }
    }
}

/// Builds the containment predicate for `boundary`.
///
/// `geometry` is the alias-qualified primary geometry column, e.g. `a.geom`.
/// Exact rings are used when available; otherwise the bounding box.
pub fn build_containment_clause(
    boundary: &GeographicBoundary,
    target_srid: TargetSrid,
    geometry: &str,
) -> GeoResult<String> {
    match boundary.polygons() {
        Some(polygons) => polygon_clause(&polygons, target_srid, geometry),
        None => bbox_clause(&boundary.bbox()?, target_srid, geometry),
    }
}

/// `<geometry> && ST_Transform(ST_MakeEnvelope(...), <srid>)`
pub fn bbox_clause(bbox: &BoundingBox, target_srid: TargetSrid, geometry: &str) -> GeoResult<String> {
    bbox.validate()?;
    Ok(format!(
        "{geometry} && ST_Transform(ST_MakeEnvelope({}, {}, {}, {}, {LONLAT_SRID}), {})",
        bbox.min_lon,
        bbox.min_lat,
        bbox.max_lon,
        bbox.max_lat,
        target_srid.render(geometry),
    ))
}

/// `ST_Intersects(<geometry>, ST_Transform(ST_GeomFromText('MULTIPOLYGON(...)', 4326), <srid>))`
pub fn polygon_clause(
    polygons: &MultiPolygon,
    target_srid: TargetSrid,
    geometry: &str,
) -> GeoResult<String> {
    let wkt = multipolygon_wkt(polygons)?;
    Ok(format!(
        "ST_Intersects({geometry}, ST_Transform(ST_GeomFromText('{wkt}', {LONLAT_SRID}), {}))",
        target_srid.render(geometry),
    ))
}

/// Renders polygons as a WKT `MULTIPOLYGON`, closing open rings.
///
/// Empty polygons and empty holes are skipped; no remaining vertex at all
/// is `EmptyBoundary`. An empty exterior ring under non-empty holes, or a
/// ring with fewer than three distinct positions, is `InvalidBoundary`.
pub fn multipolygon_wkt(polygons: &MultiPolygon) -> GeoResult<String> {
    let mut rendered_polygons = Vec::with_capacity(polygons.len());

    for (p, polygon) in polygons.iter().enumerate() {
        let mut rendered_rings = Vec::with_capacity(polygon.len());
        let has_vertices = polygon.iter().any(|ring| !ring.is_empty());
        for (r, ring) in polygon.iter().enumerate() {
            if ring.is_empty() {
                // Skipping an empty exterior would promote the first hole
                if r == 0 && has_vertices {
                    return Err(GeoError::invalid_boundary(format!(
                        "Polygon {} has an empty exterior ring but non-empty holes",
                        p
                    )));
                }
                continue;
            }
            rendered_rings.push(ring_wkt(ring, p, r)?);
        }
        if !rendered_rings.is_empty() {
            rendered_polygons.push(format!("({})", rendered_rings.join(", ")));
        }
    }

    if rendered_polygons.is_empty() {
        return Err(GeoError::empty_boundary());
    }
    Ok(format!("MULTIPOLYGON({})", rendered_polygons.join(", ")))
}

fn ring_wkt(ring: &[Position], polygon: usize, index: usize) -> GeoResult<String> {
    if let Some(bad) = ring.iter().find(|v| !v.lon.is_finite() || !v.lat.is_finite()) {
        return Err(GeoError::invalid_boundary(format!(
            "Non-finite coordinate [{}, {}] in polygon {} ring {}",
            bad.lon, bad.lat, polygon, index
        )));
    }

    let mut distinct: Vec<&Position> = Vec::with_capacity(ring.len());
    for v in ring {
        if !distinct.contains(&v) {
            distinct.push(v);
        }
    }
    if distinct.len() < 3 {
        return Err(GeoError::invalid_boundary(format!(
            "Polygon {} ring {} has {} distinct positions, need at least 3",
            polygon,
            index,
            distinct.len()
        )));
    }

    let mut out = String::from("(");
    for (i, v) in ring.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{} {}", v.lon, v.lat);
    }
    if ring.first() != ring.last() {
        let _ = write!(out, ", {} {}", ring[0].lon, ring[0].lat);
    }
    out.push(')');
    Ok(out)
}
