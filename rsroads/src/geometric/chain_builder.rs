//! Segment stitching
//!
//! Sources deliver a road as an unordered pile of line fragments. The builder
//! seeds a chain with the first fragment left in the pool and keeps attaching
//! the first fragment whose endpoint touches either end of the chain, until a
//! full pass over the pool finds nothing. Then the chain is closed and the next
//! one is seeded.
//!
//! The first-match rule is observable at forks: when two fragments could both
//! attach, the one earlier in input order wins.

use tracing::debug;

use crate::geo_core::{Chain, MultiLineString, Point, RawGeometry, Segment};

/// Squared distance, in raw degree units, below which two endpoints coincide.
///
/// Planar on longitude/latitude, so the matching radius shrinks in metres
/// towards the poles. Changing it changes output on real data.
pub const MERGE_TOLERANCE_SQ: f64 = 0.00005;

/// Stitches a pool of segments into continuous chains
#[derive(Debug, Clone, Default)]
pub struct ChainBuilder {
    pool: Vec<Segment>,
}

impl ChainBuilder {
    /// Empty segments carry no endpoints and are dropped from the pool
    pub fn new(segments: Vec<Segment>) -> Self {
        let pool: Vec<Segment> = segments.into_iter().filter(|s| !s.is_empty()).collect();
        ChainBuilder { pool }
    }

    pub fn from_raw(geometry: RawGeometry) -> Self {
        Self::new(geometry.into_segments())
    }

    /// Number of segments not yet consumed
    pub fn remaining(&self) -> usize {
        self.pool.len()
    }

    pub fn build(mut self) -> Vec<Chain> {
        let segment_count = self.pool.len();
        let mut chains = Vec::new();

        while !self.pool.is_empty() {
            let mut open = self.pool.remove(0);

            // Restart from the top of the pool after every successful merge
            while let Some(index) = self
                .pool
                .iter()
                .position(|candidate| try_merge(&mut open, candidate))
            {
                self.pool.remove(index);
            }

            chains.push(Chain::new(open));
        }

        debug!(
            segments = segment_count,
            chains = chains.len(),
            "Stitched segments into chains"
        );
        chains
    }
}

/// Attach `segment` to either end of the open chain when an endpoint matches.
///
/// The candidate's copy of the join point is dropped. Returns false and leaves
/// the chain untouched when no endpoint pair is within tolerance.
fn try_merge(chain: &mut Vec<Point>, segment: &[Point]) -> bool {
    let (Some(chain_start), Some(chain_end)) = (chain.first().copied(), chain.last().copied())
    else {
        return false;
    };
    let (Some(seg_start), Some(seg_end)) = (segment.first(), segment.last()) else {
        return false;
    };
    let last = segment.len() - 1;

    if chain_end.dist_sq(seg_start) < MERGE_TOLERANCE_SQ {
        chain.extend_from_slice(&segment[1..]);
    } else if chain_end.dist_sq(seg_end) < MERGE_TOLERANCE_SQ {
        chain.extend(segment[..last].iter().rev().copied());
    } else if chain_start.dist_sq(seg_end) < MERGE_TOLERANCE_SQ {
        chain.splice(0..0, segment[..last].iter().copied());
    } else if chain_start.dist_sq(seg_start) < MERGE_TOLERANCE_SQ {
        chain.splice(0..0, segment[1..].iter().rev().copied());
    } else {
        return false;
    }
    true
}

/// Normalize raw road geometry into stitched chains
pub fn optimize_geometry(geometry: RawGeometry) -> MultiLineString {
    MultiLineString::new(ChainBuilder::from_raw(geometry).build())
}
