use geo::HaversineLength;
use geojson::{GeoJson, Geometry, Value};
use rsroads::{Chain, ElevationLookup, MultiLineString, Point, RawGeometry};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Initialize the WASM module with panic hook
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Set panic hook for better error messages (alternative to init)
#[wasm_bindgen]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

fn parse_geometry(geojson_str: &str) -> Result<RawGeometry, JsValue> {
    geojson_str
        .parse::<RawGeometry>()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Take the parts of a geometry as chains, in their stored order
fn as_chains(raw: RawGeometry) -> MultiLineString {
    MultiLineString::new(raw.into_segments().into_iter().map(Chain::from).collect())
}

fn to_geojson_string(geometry: &MultiLineString) -> String {
    GeoJson::Geometry(geometry.to_geojson()).to_string()
}

fn line_string_to_geojson_string(chain: &Chain) -> String {
    let positions = chain.points.iter().map(Point::to_position).collect();
    GeoJson::Geometry(Geometry::new(Value::LineString(positions))).to_string()
}

/// A LineString comes back as a LineString, anything else as a MultiLineString
fn smooth_raw(raw: RawGeometry) -> String {
    match raw {
        RawGeometry::LineString(segment) => {
            line_string_to_geojson_string(&rsroads::smooth_chain(Chain::from(segment)))
        }
        raw => to_geojson_string(&rsroads::smooth_elevation(as_chains(raw))),
    }
}

fn enrich_raw(raw: RawGeometry, lookup: &dyn ElevationLookup) -> String {
    match raw {
        RawGeometry::LineString(segment) => {
            line_string_to_geojson_string(&rsroads::enrich_chain(Chain::from(segment), lookup))
        }
        raw => to_geojson_string(&rsroads::enrich_elevation(as_chains(raw), lookup)),
    }
}

/// Stitch a LineString or MultiLineString (or a Feature carrying one) into
/// continuous chains.
///
/// # Returns
/// A MultiLineString geometry as GeoJSON text
///
/// # Errors
/// Returns JsValue error if the input is not a line geometry
#[wasm_bindgen]
pub fn optimize_geometry(geojson_str: &str) -> Result<String, JsValue> {
    let raw = parse_geometry(geojson_str)?;
    Ok(to_geojson_string(&rsroads::optimize_geometry(raw)))
}

/// Smooth the elevation of every part of a line geometry.
///
/// Parts are taken as already-stitched chains; nothing is merged. The output
/// has the same geometry type as the input.
#[wasm_bindgen]
pub fn smooth_elevation(geojson_str: &str) -> Result<String, JsValue> {
    Ok(smooth_raw(parse_geometry(geojson_str)?))
}

/// Elevation lookup delegating to a JavaScript function.
///
/// The function receives `[[lat, lon], ...]` and returns an array of numbers
/// or nulls in the same order. A thrown exception fails the batch.
struct JsLookup<'a> {
    callback: &'a js_sys::Function,
}

impl ElevationLookup for JsLookup<'_> {
    fn lookup(&self, locations: &[(f64, f64)]) -> anyhow::Result<Vec<Option<f64>>> {
        let request = js_sys::Array::new_with_length(locations.len() as u32);
        for (index, &(lat, lon)) in locations.iter().enumerate() {
            let pair = js_sys::Array::of2(&JsValue::from_f64(lat), &JsValue::from_f64(lon));
            request.set(index as u32, pair.into());
        }

        let response = self
            .callback
            .call1(&JsValue::NULL, &request)
            .map_err(|e| anyhow::anyhow!("Elevation callback threw: {:?}", e))?;

        serde_wasm_bindgen::from_value::<Vec<Option<f64>>>(response)
            .map_err(|e| anyhow::anyhow!("Elevation callback returned invalid data: {}", e))
    }
}

/// Backfill missing heights through `lookup`, then smooth them.
///
/// # Arguments
/// * `geojson_str` - Line geometry whose parts are already-stitched chains
/// * `lookup` - JS function `(locations: [lat, lon][]) => (number | null)[]`
///
/// Failed or incomplete lookups leave a height of 0. The output has the same
/// geometry type as the input.
#[wasm_bindgen]
pub fn enrich_elevation(geojson_str: &str, lookup: &js_sys::Function) -> Result<String, JsValue> {
    let raw = parse_geometry(geojson_str)?;
    Ok(enrich_raw(raw, &JsLookup { callback: lookup }))
}

/// Road statistics structure
#[derive(Serialize)]
struct RoadStats {
    segment_count: usize,
    chain_count: usize,
    point_count: usize,
    elevated_point_count: usize,
    length_km: f64,
}

fn compute_stats(raw: RawGeometry) -> RoadStats {
    let segment_count = raw.clone().into_segments().len();
    let geometry = rsroads::optimize_geometry(raw);
    let lines: geo::MultiLineString<f64> = (&geometry).into();

    RoadStats {
        segment_count,
        chain_count: geometry.chain_count(),
        point_count: geometry.point_count(),
        elevated_point_count: geometry.points().filter(|p| p.has_elevation()).count(),
        length_km: lines.haversine_length() / 1000.0,
    }
}

/// Stitch a line geometry and report its chain and point counts and length
///
/// # Errors
/// Returns JsValue error if parsing or serialization fails
#[wasm_bindgen]
pub fn road_stats(geojson_str: &str) -> Result<JsValue, JsValue> {
    let stats = compute_stats(parse_geometry(geojson_str)?);
    serde_wasm_bindgen::to_value(&stats)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIECES: &str = r#"{"type":"MultiLineString","coordinates":[
        [[1,0,10],[2,0,20]], [[0,0,0],[1,0,10]], [[8,8],[9,9]]
    ]}"#;

    #[test]
    fn test_compute_stats() {
        let raw: RawGeometry = PIECES.parse().unwrap();
        let stats = compute_stats(raw);
        assert_eq!(stats.segment_count, 3);
        assert_eq!(stats.chain_count, 2);
        assert_eq!(stats.point_count, 5);
        assert_eq!(stats.elevated_point_count, 3);
        assert!(stats.length_km > 0.0);
    }

    fn parse_output(text: &str) -> Geometry {
        match text.parse::<GeoJson>().unwrap() {
            GeoJson::Geometry(g) => g,
            other => panic!("expected a geometry, got {:?}", other),
        }
    }

    #[test]
    fn test_smooth_keeps_line_string() {
        let raw: RawGeometry = r#"{"type":"LineString","coordinates":[[0,0,1],[0,1,2],[0,2,6]]}"#
            .parse()
            .unwrap();
        let geometry = parse_output(&smooth_raw(raw));
        assert_eq!(
            geometry.value,
            Value::LineString(vec![
                vec![0.0, 0.0, 3.0],
                vec![0.0, 1.0, 3.0],
                vec![0.0, 2.0, 3.0]
            ])
        );

        let raw: RawGeometry = PIECES.parse().unwrap();
        match parse_output(&smooth_raw(raw)).value {
            Value::MultiLineString(lines) => assert_eq!(lines.len(), 3),
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn test_enrich_keeps_line_string() {
        let lookup = |locations: &[(f64, f64)]| -> anyhow::Result<Vec<Option<f64>>> {
            Ok(vec![Some(250.0); locations.len()])
        };
        let raw: RawGeometry = r#"{"type":"LineString","coordinates":[[0,0],[0,0.5],[0,1]]}"#
            .parse()
            .unwrap();
        match parse_output(&enrich_raw(raw, &lookup)).value {
            Value::LineString(positions) => {
                assert_eq!(positions.len(), 3);
                assert!(positions.iter().all(|p| p[2] == 250.0));
            }
            other => panic!("unexpected geometry {:?}", other),
        }

        let raw: RawGeometry =
            r#"{"type":"MultiLineString","coordinates":[[[0,0],[0,0.5],[0,1]]]}"#
                .parse()
                .unwrap();
        assert!(matches!(
            parse_output(&enrich_raw(raw, &lookup)).value,
            Value::MultiLineString(_)
        ));
    }

    #[test]
    fn test_as_chains_keeps_parts() {
        let raw: RawGeometry = PIECES.parse().unwrap();
        let geometry = as_chains(raw);
        assert_eq!(geometry.chain_count(), 3);
        assert_eq!(geometry.point_count(), 6);
    }
}
