//! Road geometry reconstruction and elevation enrichment.
//!
//! Raw road geometry from GIS feature sources usually arrives as an unordered
//! pile of short line fragments without heights. This crate turns it into a
//! small set of continuous chains and fills the elevation channel:
//!
//! - **[`optimize_geometry`]**: stitches segments into chains (first match wins)
//! - **[`enrich_elevation`]**: backfills missing heights through an
//!   [`ElevationLookup`], then smooths them with a centered moving average
//! - **[`Road`]**: runs both stages for one named road
//!
//! Coordinates are plain `(longitude, latitude[, elevation])` tuples; no CRS
//! handling happens here.

pub mod collect;
pub mod commons;
pub mod config;
pub mod geo_core;
pub mod geometric;

pub use config::RoadConfig;
pub use geo_core::{BoundingBox, Chain, MultiLineString, Point, RawGeometry, Segment};
pub use geometric::chain_builder::{optimize_geometry, ChainBuilder, MERGE_TOLERANCE_SQ};
pub use geometric::elevation::{
    backfill_chain, enrich_chain, enrich_elevation, smooth_chain, smooth_elevation,
    ElevationLookup, ELEVATION_BATCH_SIZE, SMOOTHING_DECIMALS, SMOOTHING_RADIUS,
};
pub use geometric::road::{group_features_by_name, RawRoad, Road};

#[cfg(feature = "http")]
pub use collect::open_elevation::OpenElevation;

/// Errors raised at the GeoJSON boundary
#[derive(Debug, thiserror::Error)]
pub enum RoadError {
    #[error("Invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Unsupported geometry type: {0} (expected LineString or MultiLineString)")]
    UnsupportedGeometry(String),

    #[error("Malformed position: expected at least 2 ordinates, got {0}")]
    MalformedPosition(usize),

    #[error("Empty segment at index {0}")]
    EmptySegment(usize),

    #[error("Feature has no geometry")]
    MissingGeometry,

    #[error("Road {0:?} has not been processed. Call run() first.")]
    NotProcessed(String),
}

pub type Result<T> = std::result::Result<T, RoadError>;
