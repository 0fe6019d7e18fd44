use anyhow::Result;
use rsroads::{OpenElevation, Point, RawGeometry, RawRoad, Road, RoadConfig};
use tracing_subscriber::EnvFilter;

/// Example: stitching a small road and enriching it through Open-Elevation
///
/// Set OPEN_ELEVATION_URL to use a self-hosted instance.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    println!("=== Example: Enriching a road with Open-Elevation ===\n");

    let mut config = RoadConfig::default();
    if let Ok(url) = std::env::var("OPEN_ELEVATION_URL") {
        config.elevation_url = url;
    }
    let service = OpenElevation::from_config(&config)?;
    println!("Lookup URL: {}", service.lookup_url());

    // Two pieces of a mountain pass, the second one stored backwards
    let raw = RawRoad::new(
        "Col du Galibier",
        RawGeometry::MultiLineString(vec![
            vec![
                Point::new(6.4070, 45.0640),
                Point::new(6.4075, 45.0620),
                Point::new(6.4081, 45.0600),
            ],
            vec![
                Point::new(6.4095, 45.0560),
                Point::new(6.4088, 45.0580),
                Point::new(6.4081, 45.0600),
            ],
        ]),
    );

    let mut road = Road::new(raw);
    road.set_config(config);
    let road = road.run(Some(&service));

    if let Some(geometry) = road.get_geometry() {
        println!("\n{}: {} chain(s)", road.name(), geometry.chain_count());
        for point in geometry.points() {
            println!(
                "  ({:.4}, {:.4}) -> {} m",
                point.x,
                point.y,
                point.z.unwrap_or_default()
            );
        }
    }

    Ok(())
}
