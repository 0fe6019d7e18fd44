use geojson::{Geometry, Value};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{Result, RoadError};

/// A road vertex: longitude, latitude and an optional elevation.
///
/// A missing `z` means "unknown", which is not the same as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Longitude
    pub x: f64,
    /// Latitude
    pub y: f64,
    /// Elevation
    pub z: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y, z: None }
    }

    pub fn with_elevation(x: f64, y: f64, z: f64) -> Self {
        Point { x, y, z: Some(z) }
    }

    pub fn has_elevation(&self) -> bool {
        self.z.is_some()
    }

    /// Squared planar distance on raw coordinate values, elevation ignored
    pub fn dist_sq(&self, other: &Point) -> f64 {
        crate::commons::basic_functions::dist_sq(self.x, self.y, other.x, other.y)
    }

    /// Read a GeoJSON position; a third ordinate is the elevation, any further
    /// ordinates are dropped.
    pub fn from_position(position: &[f64]) -> Result<Self> {
        match *position {
            [x, y] => Ok(Point::new(x, y)),
            [x, y, z, ..] => Ok(Point::with_elevation(x, y, z)),
            _ => Err(RoadError::MalformedPosition(position.len())),
        }
    }

    pub fn to_position(&self) -> Vec<f64> {
        match self.z {
            Some(z) => vec![self.x, self.y, z],
            None => vec![self.x, self.y],
        }
    }
}

impl From<Point> for geo::Coord<f64> {
    fn from(point: Point) -> Self {
        geo::Coord {
            x: point.x,
            y: point.y,
        }
    }
}

/// One raw line fragment as delivered by a source
pub type Segment = Vec<Point>;

/// A continuous polyline assembled from one or more segments
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Chain {
    pub points: Vec<Point>,
}

impl Chain {
    pub fn new(points: Vec<Point>) -> Self {
        Chain { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when every point carries an elevation
    pub fn is_fully_elevated(&self) -> bool {
        self.points.iter().all(Point::has_elevation)
    }
}

impl From<Vec<Point>> for Chain {
    fn from(points: Vec<Point>) -> Self {
        Chain::new(points)
    }
}

impl From<&Chain> for geo::LineString<f64> {
    fn from(chain: &Chain) -> Self {
        chain.points.iter().copied().map(geo::Coord::from).collect()
    }
}

/// The chains of one named road. Chains are unordered among themselves.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MultiLineString {
    pub chains: Vec<Chain>,
}

impl MultiLineString {
    pub fn new(chains: Vec<Chain>) -> Self {
        MultiLineString { chains }
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    pub fn point_count(&self) -> usize {
        self.chains.iter().map(Chain::len).sum()
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.chains.iter().flat_map(|chain| chain.points.iter())
    }

    pub fn to_geojson(&self) -> Geometry {
        let lines = self
            .chains
            .iter()
            .map(|chain| chain.points.iter().map(Point::to_position).collect())
            .collect();
        Geometry::new(Value::MultiLineString(lines))
    }

    /// Parse a GeoJSON geometry and stitch it
    pub fn from_geojson(geometry: &Geometry) -> Result<Self> {
        Ok(crate::optimize_geometry(RawGeometry::from_geojson(geometry)?))
    }
}

impl From<&MultiLineString> for geo::MultiLineString<f64> {
    fn from(geometry: &MultiLineString) -> Self {
        geo::MultiLineString::new(geometry.chains.iter().map(geo::LineString::from).collect())
    }
}

/// Road geometry as tagged by its source, before stitching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawGeometry {
    LineString(Segment),
    MultiLineString(Vec<Segment>),
}

impl RawGeometry {
    /// Flatten into the segment pool, each segment used verbatim
    pub fn into_segments(self) -> Vec<Segment> {
        match self {
            RawGeometry::LineString(segment) => vec![segment],
            RawGeometry::MultiLineString(segments) => segments,
        }
    }

    pub fn from_geojson(geometry: &Geometry) -> Result<Self> {
        match &geometry.value {
            Value::LineString(positions) => {
                Ok(RawGeometry::LineString(parse_segment(positions, 0)?))
            }
            Value::MultiLineString(lines) => {
                let segments = lines
                    .iter()
                    .enumerate()
                    .map(|(index, positions)| parse_segment(positions, index))
                    .collect::<Result<Vec<_>>>()?;
                Ok(RawGeometry::MultiLineString(segments))
            }
            other => Err(RoadError::UnsupportedGeometry(geometry_type(other).to_string())),
        }
    }
}

impl FromStr for RawGeometry {
    type Err = RoadError;

    /// Accepts a bare geometry or a feature carrying one
    fn from_str(s: &str) -> Result<Self> {
        match s.parse::<geojson::GeoJson>()? {
            geojson::GeoJson::Geometry(geometry) => RawGeometry::from_geojson(&geometry),
            geojson::GeoJson::Feature(feature) => feature
                .geometry
                .as_ref()
                .ok_or(RoadError::MissingGeometry)
                .and_then(RawGeometry::from_geojson),
            geojson::GeoJson::FeatureCollection(_) => Err(RoadError::UnsupportedGeometry(
                "FeatureCollection".to_string(),
            )),
        }
    }
}

fn geometry_type(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn parse_segment(positions: &[Vec<f64>], index: usize) -> Result<Segment> {
    if positions.is_empty() {
        return Err(RoadError::EmptySegment(index));
    }
    positions
        .iter()
        .map(|position| Point::from_position(position))
        .collect()
}

/// Bounding box structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64, // min longitude
    pub min_y: f64, // min latitude
    pub max_x: f64, // max longitude
    pub max_y: f64, // max latitude
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest box holding every finite point, `None` when there is none
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        points
            .into_iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .fold(None, |bbox: Option<BoundingBox>, p| {
                Some(match bbox {
                    None => BoundingBox::new(p.x, p.y, p.x, p.y),
                    Some(b) => BoundingBox::new(
                        b.min_x.min(p.x),
                        b.min_y.min(p.y),
                        b.max_x.max(p.x),
                        b.max_y.max(p.y),
                    ),
                })
            })
    }

    /// GeoJSON `bbox` member order: west, south, east, north
    pub fn to_geojson_bbox(&self) -> Vec<f64> {
        vec![self.min_x, self.min_y, self.max_x, self.max_y]
    }
}
