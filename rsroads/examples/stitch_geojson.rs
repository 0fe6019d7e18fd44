use anyhow::{Context, Result};
use geojson::{FeatureCollection, GeoJson};
use rsroads::{group_features_by_name, Road, RoadConfig};
use tracing_subscriber::EnvFilter;

/// Example: stitching the roads of a GeoJSON FeatureCollection
///
/// Usage: cargo run --example stitch_geojson -- input.geojson [output.geojson]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .context("Usage: stitch_geojson <input.geojson> [output.geojson]")?;
    let output = args.next();

    println!("=== Example: Stitching road segments from {} ===\n", input);

    let text = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read GeoJSON file: {}", input))?;
    let collection = match text.parse::<GeoJson>().context("Failed to parse GeoJSON")? {
        GeoJson::FeatureCollection(fc) => fc,
        _ => anyhow::bail!("Input must be a FeatureCollection"),
    };

    let raw_roads = group_features_by_name(&collection);
    println!("Found {} named roads", raw_roads.len());

    let mut features = Vec::with_capacity(raw_roads.len());
    for raw in raw_roads {
        let segment_count = raw.geometry.clone().into_segments().len();
        let mut road = Road::new(raw);
        road.set_config(RoadConfig::without_elevation());
        let road = road.run(None);

        if let Some(geometry) = road.get_geometry() {
            println!(
                "  - {}: {} segments -> {} chains, {:.2} km",
                road.name(),
                segment_count,
                geometry.chain_count(),
                road.length_km().unwrap_or_default()
            );
        }
        features.push(road.to_feature()?);
    }

    let result = GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    });

    match output {
        Some(path) => {
            std::fs::write(&path, result.to_string())
                .with_context(|| format!("Failed to write GeoJSON file: {}", path))?;
            println!("\nSaved to: {}", path);
        }
        None => println!("\n{}", result),
    }

    Ok(())
}
