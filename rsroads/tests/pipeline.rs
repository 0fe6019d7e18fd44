use std::cell::Cell;

use geojson::{FeatureCollection, GeoJson};
use rsroads::{
    group_features_by_name, optimize_geometry, ElevationLookup, MultiLineString, RawGeometry,
    Road, RoadConfig,
};

const BYWAY: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"Name": "Canyon Byway"},
     "geometry": {"type": "LineString", "coordinates": [[-111.2, 36.0], [-111.1, 36.0]]}},
    {"type": "Feature", "properties": {"Name": "Canyon Byway"},
     "geometry": {"type": "LineString", "coordinates": [[-111.0, 36.0], [-111.1, 36.0]]}},
    {"type": "Feature", "properties": {"Name": "Canyon Byway"},
     "geometry": {"type": "MultiLineString", "coordinates": [
        [[-110.5, 36.5], [-110.4, 36.5]],
        [[-111.3, 36.0], [-111.2, 36.0]]
     ]}},
    {"type": "Feature", "properties": {"Name": "Mesa Spur"},
     "geometry": {"type": "LineString", "coordinates": [[-110.0, 35.0, 1500.0], [-110.0, 35.001, 1510.0], [-110.0, 35.002, 1502.0]]}}
  ]
}"#;

fn byway() -> FeatureCollection {
    match BYWAY.parse::<GeoJson>().unwrap() {
        GeoJson::FeatureCollection(fc) => fc,
        other => panic!("expected a FeatureCollection, got {:?}", other),
    }
}

/// Answers 2000 m everywhere and counts the points it was asked for
struct CountingLookup {
    requested: Cell<usize>,
}

impl ElevationLookup for CountingLookup {
    fn lookup(&self, locations: &[(f64, f64)]) -> anyhow::Result<Vec<Option<f64>>> {
        self.requested.set(self.requested.get() + locations.len());
        Ok(vec![Some(2000.0); locations.len()])
    }
}

#[test]
fn test_features_to_enriched_roads() {
    let roads = group_features_by_name(&byway());
    assert_eq!(roads.len(), 2);

    let lookup = CountingLookup {
        requested: Cell::new(0),
    };
    let processed: Vec<Road> = roads
        .into_iter()
        .map(|raw| Road::new(raw).run(Some(&lookup)))
        .collect();

    // Canyon Byway: three touching pieces form one chain, the far piece stays apart
    let canyon = processed[0].get_geometry().unwrap();
    assert_eq!(processed[0].name(), "Canyon Byway");
    assert_eq!(canyon.chain_count(), 2);
    let xs: Vec<f64> = canyon.chains[0].points.iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![-111.3, -111.2, -111.1, -111.0]);
    assert_eq!(canyon.chains[1].len(), 2);
    assert!(canyon.points().all(|p| p.z == Some(2000.0)));

    // Mesa Spur already carries heights: no lookups, only smoothing
    let mesa = processed[1].get_geometry().unwrap();
    let zs: Vec<Option<f64>> = mesa.points().map(|p| p.z).collect();
    assert_eq!(zs, vec![Some(1504.0); 3]);

    assert_eq!(lookup.requested.get(), 6);
}

#[test]
fn test_lookup_outage_degrades_to_zero() {
    let failing = |_: &[(f64, f64)]| -> anyhow::Result<Vec<Option<f64>>> {
        anyhow::bail!("connection refused")
    };
    let raw: RawGeometry = r#"{"type":"LineString","coordinates":[[0,0],[0.001,0],[0.002,0]]}"#
        .parse()
        .unwrap();

    let road = Road::new(rsroads::RawRoad::new("Dead Zone", raw)).run(Some(&failing));
    let geometry = road.get_geometry().unwrap();
    assert_eq!(geometry.point_count(), 3);
    assert!(geometry.points().all(|p| p.z == Some(0.0)));
}

#[test]
fn test_elevation_disabled_by_config() {
    let config = RoadConfig::from_json(r#"{"elevation_enabled": false}"#).unwrap();
    let lookup = CountingLookup {
        requested: Cell::new(0),
    };
    for raw in group_features_by_name(&byway()) {
        let mut road = Road::new(raw);
        road.set_config(config.clone());
        road.run_internal(Some(&lookup));
        assert!(road.get_geometry().is_some());
    }
    assert_eq!(lookup.requested.get(), 0);
}

#[test]
fn test_geojson_round_trip_through_engine() {
    let raw: RawGeometry = r#"{"type":"MultiLineString","coordinates":[
        [[0,0],[1,1]], [[2,2],[1,1]], [[5,5],[6,6]]
    ]}"#
    .parse()
    .unwrap();
    let geometry = optimize_geometry(raw);

    let text = GeoJson::Geometry(geometry.to_geojson()).to_string();
    let reparsed = match text.parse::<GeoJson>().unwrap() {
        GeoJson::Geometry(g) => MultiLineString::from_geojson(&g).unwrap(),
        other => panic!("expected a geometry, got {:?}", other),
    };
    assert_eq!(reparsed, geometry);
    assert_eq!(reparsed.chain_count(), 2);
}
