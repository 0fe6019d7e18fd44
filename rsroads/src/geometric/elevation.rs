//! Elevation backfill and smoothing
//!
//! Backfill asks an [`ElevationLookup`] for every point without a height, in
//! batches. It is best effort: a failing batch or a non-finite coordinate only
//! degrades the affected points to an elevation of `0`.
//!
//! Smoothing replaces each height with the mean of its neighbours within
//! [`SMOOTHING_RADIUS`] indices on either side, clipped at the chain ends.

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::commons::basic_functions::round_to;
use crate::geo_core::{Chain, MultiLineString};

/// Maximum number of locations sent in one lookup call
pub const ELEVATION_BATCH_SIZE: usize = 1000;

/// Neighbours taken on each side of a point (21-sample window)
pub const SMOOTHING_RADIUS: usize = 10;

/// Decimals kept on smoothed elevations
pub const SMOOTHING_DECIMALS: u32 = 1;

/// Source of ground elevation for coordinates
///
/// `lookup` receives `(latitude, longitude)` pairs and returns one entry per
/// pair, in order; `None` marks a location the service could not resolve. An
/// `Err` fails the whole batch.
pub trait ElevationLookup {
    fn lookup(&self, locations: &[(f64, f64)]) -> anyhow::Result<Vec<Option<f64>>>;
}

impl<F> ElevationLookup for F
where
    F: Fn(&[(f64, f64)]) -> anyhow::Result<Vec<Option<f64>>>,
{
    fn lookup(&self, locations: &[(f64, f64)]) -> anyhow::Result<Vec<Option<f64>>> {
        self(locations)
    }
}

/// Fill every missing elevation of a chain.
///
/// Point count, order and coordinates are preserved. Points that could not be
/// resolved end up at `0`. A fully elevated chain is returned as is without
/// calling the lookup.
pub fn backfill_chain(chain: Chain, lookup: &dyn ElevationLookup) -> Chain {
    if chain.is_fully_elevated() {
        return chain;
    }

    let missing: Vec<usize> = chain
        .points
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.has_elevation())
        .map(|(index, _)| index)
        .collect();

    let mut points = chain.points;
    for &index in &missing {
        points[index].z = Some(0.0);
    }

    for (batch_number, batch) in missing.chunks(ELEVATION_BATCH_SIZE).enumerate() {
        // sent_to_index[k] is the chain index of the k-th location sent
        let mut locations = Vec::with_capacity(batch.len());
        let mut sent_to_index = Vec::with_capacity(batch.len());
        for &index in batch {
            let p = &points[index];
            if !p.x.is_finite() || !p.y.is_finite() {
                continue;
            }
            locations.push((p.y, p.x));
            sent_to_index.push(index);
        }

        if locations.is_empty() {
            debug!(batch = batch_number, "Skipping batch with no finite coordinates");
            continue;
        }

        match lookup.lookup(&locations) {
            Ok(elevations) => {
                debug!(
                    batch = batch_number,
                    sent = locations.len(),
                    received = elevations.len(),
                    "Elevation batch resolved"
                );
                for (&index, elevation) in sent_to_index.iter().zip(elevations) {
                    if let Some(z) = elevation.filter(|z| z.is_finite()) {
                        points[index].z = Some(z);
                    }
                }
            }
            Err(err) => {
                warn!(
                    batch = batch_number,
                    points = locations.len(),
                    error = %err,
                    "Elevation lookup failed, defaulting batch to 0"
                );
            }
        }
    }

    Chain::new(points)
}

/// Centered moving average over the elevation channel.
///
/// Chains shorter than 3 points are returned unchanged. Every output value is
/// computed from the untouched input heights; points without a height are left
/// out of the averages.
pub fn smooth_chain(chain: Chain) -> Chain {
    let n = chain.len();
    if n < 3 {
        return chain;
    }

    let heights: Vec<Option<f64>> = chain.points.iter().map(|p| p.z).collect();

    let points = chain
        .points
        .into_iter()
        .enumerate()
        .map(|(i, mut point)| {
            let lo = i.saturating_sub(SMOOTHING_RADIUS);
            let hi = (i + SMOOTHING_RADIUS).min(n - 1);
            let (sum, count) = heights[lo..=hi]
                .iter()
                .flatten()
                .fold((0.0_f64, 0usize), |(sum, count), z| (sum + z, count + 1));
            if count > 0 {
                point.z = Some(round_to(sum / count as f64, SMOOTHING_DECIMALS));
            }
            point
        })
        .collect();

    Chain::new(points)
}

/// Backfill then smooth a single chain, keeping its shape
pub fn enrich_chain(chain: Chain, lookup: &dyn ElevationLookup) -> Chain {
    smooth_chain(backfill_chain(chain, lookup))
}

/// Smooth every chain of a road independently
pub fn smooth_elevation(geometry: MultiLineString) -> MultiLineString {
    #[cfg(feature = "rayon")]
    let chains = geometry.chains.into_par_iter().map(smooth_chain).collect();

    #[cfg(not(feature = "rayon"))]
    let chains = geometry.chains.into_iter().map(smooth_chain).collect();

    MultiLineString::new(chains)
}

/// Backfill then smooth every chain of a road.
///
/// Never fails; the output has the same chains and point counts as the input,
/// with an elevation on every point.
pub fn enrich_elevation(
    geometry: MultiLineString,
    lookup: &dyn ElevationLookup,
) -> MultiLineString {
    let chains = geometry
        .chains
        .into_iter()
        .map(|chain| backfill_chain(chain, lookup))
        .collect();

    smooth_elevation(MultiLineString::new(chains))
}
