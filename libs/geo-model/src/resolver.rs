//! Line path resolution
//!
//! Orders an unordered bag of sample points into a directed path between two
//! fixed endpoints using a nearest-forward chain:
//!
//! 1. seed at the sample closest to side-1
//! 2. repeatedly append the unvisited sample closest to the chain's tail
//! 3. reverse the chain when the swapped endpoint assignment is strictly shorter
//!
//! Ties are broken on (lat, lon) so the output does not depend on input order.
//! The heuristic is O(n²), per-line sample counts are in the tens.

use std::cmp::Ordering;
use tracing::warn;

use crate::position::Position;

/// Resolve an ordered path `[side1, p1..pn, side2]`
///
/// Every sample appears exactly once in the output, duplicates included.
/// A line with identical endpoints is logged and resolved the same way.
pub fn resolve(side1: Position, side2: Position, samples: &[Position]) -> Vec<Position> {
    if side1 == side2 {
        warn!(
            lat = side1.lat,
            lon = side1.lon,
            samples = samples.len(),
            "Line has identical endpoints"
        );
    }

    let mut path = Vec::with_capacity(samples.len() + 2);
    path.push(side1);
    path.extend(order_interior(side1, side2, samples));
    path.push(side2);
    path
}

/// Ordered interior chain, endpoints excluded
pub fn order_interior(side1: Position, side2: Position, samples: &[Position]) -> Vec<Position> {
    let mut remaining = samples.to_vec();
    let mut chain = Vec::with_capacity(remaining.len());

    let mut anchor = side1;
    while let Some(index) = nearest(&remaining, &anchor) {
        let next = remaining.swap_remove(index);
        chain.push(next);
        anchor = next;
    }

    if let (Some(first), Some(last)) = (chain.first(), chain.last()) {
        let forward = first.distance(&side1) + last.distance(&side2);
        let reversed = first.distance(&side2) + last.distance(&side1);
        if reversed < forward {
            chain.reverse();
        }
    }

    chain
}

/// Index of the candidate closest to `from`, ties on lowest (lat, lon)
fn nearest(candidates: &[Position], from: &Position) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| compare_from(from, a, b))
        .map(|(index, _)| index)
}

fn compare_from(from: &Position, a: &Position, b: &Position) -> Ordering {
    a.distance(from)
        .total_cmp(&b.distance(from))
        .then_with(|| a.lexicographic_cmp(b))
}
