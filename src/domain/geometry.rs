//! Feature geometry in geographic coordinates (EPSG:4326)
//!
//! Geometries are GeoJSON polygons and multipolygons. Areas are computed on a
//! sphere, which is accurate to well under a percent at the field sizes the
//! sizing policy cares about.

use crate::domain::ids::FeatureIndex;
use serde::{Deserialize, Serialize};

/// Earth radius in meters (WGS84 semi-major axis)
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Square meters per hectare
pub const SQM_PER_HECTARE: f64 = 10_000.0;

/// A longitude/latitude pair in degrees
///
/// Deserializes from a GeoJSON position; any altitude is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Position {
    /// Longitude in degrees
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
}

impl Position {
    /// Create a new position
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [lon, lat, ..] => Ok(Self::new(*lon, *lat)),
            _ => Err(format!(
                "GeoJSON position needs at least 2 coordinates, got {}",
                value.len()
            )),
        }
    }
}

impl From<Position> for Vec<f64> {
    fn from(p: Position) -> Self {
        vec![p.lon, p.lat]
    }
}

/// A linear ring (first and last positions may coincide)
pub type Ring = Vec<Position>;

/// GeoJSON geometry subset used for feature footprints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    /// A single point; has no area
    Point(Position),
    /// Exterior ring followed by holes
    Polygon(Vec<Ring>),
    /// Several polygons
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
    /// Geodesic area in square meters; holes are subtracted
    pub fn area_sqm(&self) -> f64 {
        match self {
            Geometry::Point(_) => 0.0,
            Geometry::Polygon(rings) => polygon_area(rings),
            Geometry::MultiPolygon(polygons) => polygons.iter().map(|p| polygon_area(p)).sum(),
        }
    }

    /// Area in hectares
    pub fn area_hectares(&self) -> f64 {
        self.area_sqm() / SQM_PER_HECTARE
    }

    /// Area-weighted centroid of the exterior rings
    ///
    /// Falls back to the vertex mean when the geometry has no area, and
    /// returns `None` when it has no positions at all.
    pub fn centroid(&self) -> Option<Position> {
        let exteriors: Vec<&Ring> = match self {
            Geometry::Point(p) => return Some(*p),
            Geometry::Polygon(rings) => rings.first().into_iter().collect(),
            Geometry::MultiPolygon(polygons) => {
                polygons.iter().filter_map(|rings| rings.first()).collect()
            }
        };

        let mut weight = 0.0;
        let mut lon_acc = 0.0;
        let mut lat_acc = 0.0;
        for ring in &exteriors {
            if let Some((area, c)) = planar_centroid(open_ring(ring)) {
                weight += area;
                lon_acc += c.lon * area;
                lat_acc += c.lat * area;
            }
        }
        if weight > f64::EPSILON {
            return Some(Position::new(lon_acc / weight, lat_acc / weight));
        }

        let vertices: Vec<&Position> = exteriors.iter().copied().flat_map(|r| open_ring(r)).collect();
        if vertices.is_empty() {
            return None;
        }
        let n = vertices.len() as f64;
        Some(Position::new(
            vertices.iter().map(|p| p.lon).sum::<f64>() / n,
            vertices.iter().map(|p| p.lat).sum::<f64>() / n,
        ))
    }

    /// Axis-aligned bounding box, `None` for empty geometry
    pub fn bounds(&self) -> Option<Bounds> {
        let mut positions: Box<dyn Iterator<Item = &Position> + '_> = match self {
            Geometry::Point(p) => Box::new(std::iter::once(p)),
            Geometry::Polygon(rings) => Box::new(rings.iter().flatten()),
            Geometry::MultiPolygon(polygons) => Box::new(polygons.iter().flatten().flatten()),
        };

        let first = positions.next()?;
        let mut bounds = Bounds::new(first.lon, first.lat, first.lon, first.lat);
        for p in positions {
            bounds.west = bounds.west.min(p.lon);
            bounds.south = bounds.south.min(p.lat);
            bounds.east = bounds.east.max(p.lon);
            bounds.north = bounds.north.max(p.lat);
        }
        Some(bounds)
    }

    /// Whether the geometry has no positions
    pub fn is_empty(&self) -> bool {
        self.bounds().is_none()
    }
}

/// Axis-aligned rectangle in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum longitude
    pub west: f64,
    /// Minimum latitude
    pub south: f64,
    /// Maximum longitude
    pub east: f64,
    /// Maximum latitude
    pub north: f64,
}

impl Bounds {
    /// Create bounds from edges
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Bounding box of a disc of `radius_m` meters around `center`
    ///
    /// Latitudes are clamped to the poles and longitudes to the antimeridian.
    pub fn around(center: Position, radius_m: f64) -> Self {
        let dlat = (radius_m / EARTH_RADIUS_M).to_degrees();
        let cos_lat = center.lat.to_radians().cos();
        let dlon = if cos_lat > 1e-12 {
            (radius_m / (EARTH_RADIUS_M * cos_lat)).to_degrees()
        } else {
            180.0
        };

        Self {
            west: (center.lon - dlon).max(-180.0),
            south: (center.lat - dlat).max(-90.0),
            east: (center.lon + dlon).min(180.0),
            north: (center.lat + dlat).min(90.0),
        }
    }

    /// Geodesic area of the rectangle in square meters
    pub fn area_sqm(&self) -> f64 {
        let dlon = (self.east - self.west).to_radians();
        let dsin = self.north.to_radians().sin() - self.south.to_radians().sin();
        (EARTH_RADIUS_M * EARTH_RADIUS_M * dlon * dsin).abs()
    }

    /// Area in hectares
    pub fn area_hectares(&self) -> f64 {
        self.area_sqm() / SQM_PER_HECTARE
    }

    /// Center of the rectangle
    pub fn center(&self) -> Position {
        Position::new((self.west + self.east) / 2.0, (self.south + self.north) / 2.0)
    }

    /// Closed counter-clockwise polygon covering the rectangle
    pub fn to_polygon(&self) -> Geometry {
        Geometry::Polygon(vec![vec![
            Position::new(self.west, self.south),
            Position::new(self.east, self.south),
            Position::new(self.east, self.north),
            Position::new(self.west, self.north),
            Position::new(self.west, self.south),
        ]])
    }
}

/// A feature from the shared collection
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Value of the collection's index property
    pub index: FeatureIndex,
    /// Footprint geometry
    pub geometry: Geometry,
}

impl Feature {
    /// Create a new feature
    pub fn new(index: FeatureIndex, geometry: Geometry) -> Self {
        Self { index, geometry }
    }
}

/// Drops the closing position of a ring if it repeats the first one
fn open_ring(ring: &[Position]) -> &[Position] {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Spherical ring area (Chamberlain & Duquette), unsigned
fn ring_area(ring: &[Position]) -> f64 {
    let ring = open_ring(ring);
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..n {
        let prev = ring[(i + n - 1) % n];
        let curr = ring[i];
        let next = ring[(i + 1) % n];
        total += (next.lon.to_radians() - prev.lon.to_radians()) * curr.lat.to_radians().sin();
    }
    (total * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs()
}

fn polygon_area(rings: &[Ring]) -> f64 {
    let Some((exterior, holes)) = rings.split_first() else {
        return 0.0;
    };
    let holes: f64 = holes.iter().map(|h| ring_area(h)).sum();
    (ring_area(exterior) - holes).max(0.0)
}

/// Shoelace centroid in degree space; returns (|area|, centroid)
fn planar_centroid(ring: &[Position]) -> Option<(f64, Position)> {
    let n = ring.len();
    if n < 3 {
        return None;
    }

    // Work relative to the first vertex to keep the cross products small
    let origin = ring[0];
    let mut twice_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let a = Position::new(ring[i].lon - origin.lon, ring[i].lat - origin.lat);
        let b = ring[(i + 1) % n];
        let b = Position::new(b.lon - origin.lon, b.lat - origin.lat);
        let cross = a.lon * b.lat - b.lon * a.lat;
        twice_area += cross;
        cx += (a.lon + b.lon) * cross;
        cy += (a.lat + b.lat) * cross;
    }
    if twice_area.abs() < f64::EPSILON {
        return None;
    }

    let area = twice_area / 2.0;
    Some((
        area.abs(),
        Position::new(
            origin.lon + cx / (6.0 * area),
            origin.lat + cy / (6.0 * area),
        ),
    ))
}
