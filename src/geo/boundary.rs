//! Municipality boundaries as returned by the gazetteer
//!
//! All coordinates are longitude/latitude in EPSG:4326. A boundary is
//! consumed once per request and never persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{GeoError, GeoResult};

/// SRID of every boundary coordinate
pub const LONLAT_SRID: i32 = 4326;

/// A `[lon, lat]` vertex. Extra ordinates (elevation) are dropped on input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

impl Position {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [lon, lat, ..] => Ok(Position::new(*lon, *lat)),
            _ => Err(format!("position needs at least 2 ordinates, got {}", value.len())),
        }
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.lon, p.lat]
    }
}

impl From<[f64; 2]> for Position {
    fn from(p: [f64; 2]) -> Self {
        Position::new(p[0], p[1])
    }
}

/// Closed or open sequence of vertices
pub type Ring = Vec<Position>;
/// Exterior ring followed by holes
pub type Polygon = Vec<Ring>;
/// One or more polygons
pub type MultiPolygon = Vec<Polygon>;

/// Axis-aligned bounds in EPSG:4326
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Checks that all bounds are finite and not inverted
    pub fn validate(&self) -> GeoResult<()> {
        let bounds = [self.min_lon, self.min_lat, self.max_lon, self.max_lat];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(GeoError::invalid_boundary(format!(
                "Bounding box has a non-finite bound: {}",
                self
            )));
        }
        if self.min_lon > self.max_lon || self.min_lat > self.max_lat {
            return Err(GeoError::invalid_boundary(format!(
                "Bounding box is inverted: {}",
                self
            )));
        }
        Ok(())
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

/// What the gazetteer returned for a municipality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeographicBoundary {
    /// Only the enclosing rectangle is known
    #[serde(rename = "bbox")]
    BoundingBox(BoundingBox),
    /// Exact rings of a single polygon
    Polygon { coordinates: Polygon },
    /// Exact rings of several polygons
    #[serde(rename = "multipolygon")]
    MultiPolygon { coordinates: MultiPolygon },
}

impl GeographicBoundary {
    /// Exact rings, if the gazetteer supplied them
    pub fn polygons(&self) -> Option<MultiPolygon> {
        match self {
            GeographicBoundary::BoundingBox(_) => None,
            GeographicBoundary::Polygon { coordinates } => Some(vec![coordinates.clone()]),
            GeographicBoundary::MultiPolygon { coordinates } => Some(coordinates.clone()),
        }
    }

    /// Enclosing rectangle, computed from the rings when needed
    pub fn bbox(&self) -> GeoResult<BoundingBox> {
        match self {
            GeographicBoundary::BoundingBox(bbox) => {
                bbox.validate()?;
                Ok(*bbox)
            }
            GeographicBoundary::Polygon { coordinates } => {
                multipolygon_to_bbox(std::slice::from_ref(coordinates))
            }
            GeographicBoundary::MultiPolygon { coordinates } => multipolygon_to_bbox(coordinates),
        }
    }
}

/// Reduces polygons to their enclosing rectangle by tracking running
/// min/max over every vertex of every ring of every polygon.
///
/// Fails with `EmptyBoundary` when there is no vertex at all and with
/// `InvalidBoundary` on non-finite coordinates.
pub fn multipolygon_to_bbox(polygons: &[Polygon]) -> GeoResult<BoundingBox> {
    let mut bbox: Option<BoundingBox> = None;

    for position in polygons.iter().flatten().flatten() {
        if !position.is_finite() {
            return Err(GeoError::invalid_boundary(format!(
                "Non-finite coordinate [{}, {}]",
                position.lon, position.lat
            )));
        }
        bbox = Some(match bbox {
            None => BoundingBox::new(position.lon, position.lat, position.lon, position.lat),
            Some(b) => BoundingBox::new(
                b.min_lon.min(position.lon),
                b.min_lat.min(position.lat),
                b.max_lon.max(position.lon),
                b.max_lat.max(position.lat),
            ),
        });
    }

    bbox.ok_or_else(GeoError::empty_boundary)
}
