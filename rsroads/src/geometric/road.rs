use geo::HaversineLength;
use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::commons::basic_functions::round_to;
use crate::config::RoadConfig;
use crate::geo_core::{BoundingBox, MultiLineString, RawGeometry, Segment};
use crate::geometric::chain_builder::optimize_geometry;
use crate::geometric::elevation::{enrich_elevation, ElevationLookup};
use crate::{Result, RoadError};

/// Properties checked, in order, for a feature's road name
const NAME_PROPERTIES: [&str; 3] = ["Name", "name", "Byway_Name"];

/// A named road as handed over by a source, before any processing
#[derive(Debug, Clone, PartialEq)]
pub struct RawRoad {
    pub name: String,
    pub geometry: RawGeometry,
}

impl RawRoad {
    pub fn new(name: impl Into<String>, geometry: RawGeometry) -> Self {
        RawRoad {
            name: name.into(),
            geometry,
        }
    }
}

/// Group line features by road name.
///
/// GIS layers often store one road as hundreds of separate features. Every
/// line part of the features sharing a name is collected into a single
/// MultiLineString, in first-seen order. Features without a name, without a
/// geometry or with a non-line geometry are skipped.
pub fn group_features_by_name(collection: &FeatureCollection) -> Vec<RawRoad> {
    let mut groups: Vec<(String, Vec<Segment>)> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for feature in &collection.features {
        let Some(name) = feature_name(feature) else {
            debug!("Skipping feature without a name");
            continue;
        };
        let Some(geometry) = feature.geometry.as_ref() else {
            debug!(road = %name, "Skipping feature without geometry");
            continue;
        };
        let segments = match RawGeometry::from_geojson(geometry) {
            Ok(raw) => raw.into_segments(),
            Err(err) => {
                warn!(road = %name, error = %err, "Skipping unusable feature geometry");
                continue;
            }
        };
        if segments.is_empty() {
            continue;
        }

        let slot = *index_by_name.entry(name.clone()).or_insert_with(|| {
            groups.push((name, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.extend(segments);
    }

    groups
        .into_iter()
        .map(|(name, segments)| RawRoad::new(name, RawGeometry::MultiLineString(segments)))
        .collect()
}

/// First non-null name property, trimmed. Numbers are taken as their text;
/// blank names count as missing.
fn feature_name(feature: &Feature) -> Option<String> {
    let properties = feature.properties.as_ref()?;
    let value = NAME_PROPERTIES
        .iter()
        .filter_map(|key| properties.get(*key))
        .find(|value| !value.is_null())?;
    let name = match value {
        JsonValue::String(text) => text.trim().to_string(),
        JsonValue::Number(number) => number.to_string(),
        _ => return None,
    };
    (!name.is_empty()).then_some(name)
}

/// Road structure
/// Stitches the geometry of one named road and optionally enriches it with
/// elevation
pub struct Road {
    name: String,
    raw: RawGeometry,
    config: RoadConfig,
    /// Processed geometry, set by run()
    geometry: Option<MultiLineString>,
}

impl Road {
    /// Create a new Road with the default configuration
    pub fn new(raw: RawRoad) -> Self {
        Road {
            name: raw.name,
            raw: raw.geometry,
            config: RoadConfig::default(),
            geometry: None,
        }
    }

    pub fn set_config(&mut self, config: RoadConfig) {
        self.config = config;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run road processing: stitch, then backfill and smooth elevation when
    /// enabled and a lookup is available
    pub fn run(mut self, lookup: Option<&dyn ElevationLookup>) -> Self {
        self.run_internal(lookup);
        self
    }

    /// Internal run method that can be called mutably
    pub fn run_internal(&mut self, lookup: Option<&dyn ElevationLookup>) {
        info!(road = %self.name, "Sorting and stitching geometry segments");
        let mut geometry = optimize_geometry(self.raw.clone());

        match (self.config.elevation_enabled, lookup) {
            (true, Some(lookup)) => {
                info!(
                    road = %self.name,
                    chains = geometry.chain_count(),
                    points = geometry.point_count(),
                    "Fetching elevation data"
                );
                geometry = enrich_elevation(geometry, lookup);
            }
            (true, None) => {
                debug!(road = %self.name, "Elevation enabled but no lookup provided");
            }
            (false, _) => {}
        }

        self.geometry = Some(geometry);
    }

    pub fn get_geometry(&self) -> Option<&MultiLineString> {
        self.geometry.as_ref()
    }

    /// Great-circle length of all chains, in kilometres (2 decimals)
    pub fn length_km(&self) -> Option<f64> {
        let geometry = self.geometry.as_ref()?;
        let lines: geo::MultiLineString<f64> = geometry.into();
        Some(round_to(lines.haversine_length() / 1000.0, 2))
    }

    /// GeoJSON feature carrying the processed geometry
    pub fn to_feature(&self) -> Result<Feature> {
        let geometry = self
            .geometry
            .as_ref()
            .ok_or_else(|| RoadError::NotProcessed(self.name.clone()))?;

        let mut properties = JsonObject::new();
        properties.insert("name".to_string(), JsonValue::from(self.name.clone()));
        if let Some(length_km) = self.length_km() {
            properties.insert("length_km".to_string(), JsonValue::from(length_km));
        }
        properties.insert(
            "chain_count".to_string(),
            JsonValue::from(geometry.chain_count()),
        );

        Ok(Feature {
            bbox: BoundingBox::from_points(geometry.points()).map(|b| b.to_geojson_bbox()),
            geometry: Some(geometry.to_geojson()),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        })
    }
}
