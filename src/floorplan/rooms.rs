//! Room discovery: every tightest counter-clockwise cycle of the wall graph.

use std::collections::HashSet;

use crate::math::angle_2d::angle_2pi;
use crate::math::polygon_2d::is_clockwise;
use crate::math::Point2;
use crate::topology::{CornerId, TopologyStore};

/// A pending step of the cycle walk: the corner to visit and the path so far.
struct Step {
    corner: CornerId,
    path: Vec<CornerId>,
}

fn position(store: &TopologyStore, corner: CornerId) -> Point2 {
    store.position(corner).unwrap_or_else(|_| Point2::origin())
}

/// Clockwise turn from the incoming edge to the candidate edge at `current`.
fn turn_angle(store: &TopologyStore, previous: CornerId, current: CornerId, next: CornerId) -> f64 {
    let origin = position(store, current);
    angle_2pi(
        &(position(store, previous) - origin),
        &(position(store, next) - origin),
    )
}

/// Walks from `first` through `second` back to `first`, turning as
/// tightly as possible at each corner.
///
/// Returns the cycle starting at `first`, or an empty vector if the walk
/// never closes.
#[must_use]
pub fn find_tightest_cycle(store: &TopologyStore, first: CornerId, second: CornerId) -> Vec<CornerId> {
    let mut stack: Vec<Step> = Vec::new();
    let mut visited: HashSet<CornerId> = HashSet::from([first]);
    let mut next = Some(Step {
        corner: second,
        path: vec![first],
    });

    while let Some(step) = next {
        let current = step.corner;
        visited.insert(current);

        if current == first && current != second {
            return step.path;
        }

        let may_close = |c: CornerId| c == first && current != second;
        let mut candidates: Vec<CornerId> = store
            .adjacent_corners(current)
            .into_iter()
            .filter(|&c| !visited.contains(&c) || may_close(c))
            .collect();

        let previous = step.path.last().copied().unwrap_or(first);
        if candidates.len() > 1 {
            // Descending, so the smallest turn is popped first.
            candidates.sort_by(|&a, &b| {
                turn_angle(store, previous, current, b).total_cmp(&turn_angle(store, previous, current, a))
            });
        }

        let mut path = step.path;
        path.push(current);
        for corner in candidates {
            stack.push(Step {
                corner,
                path: path.clone(),
            });
        }

        next = stack.pop();
    }

    Vec::new()
}

/// Drops cycles that are a rotation of an earlier one.
///
/// Reversed cycles are not matched here; the winding filter removes the
/// clockwise copy afterwards.
#[must_use]
pub fn remove_duplicate_cycles(cycles: Vec<Vec<CornerId>>) -> Vec<Vec<CornerId>> {
    let mut seen: HashSet<Vec<CornerId>> = HashSet::new();
    let mut unique = Vec::new();
    for cycle in cycles {
        if cycle.is_empty() {
            continue;
        }
        let duplicate = (0..cycle.len()).any(|shift| {
            let mut rotated = cycle.clone();
            rotated.rotate_left(shift);
            seen.contains(&rotated)
        });
        if !duplicate {
            seen.insert(cycle.clone());
            unique.push(cycle);
        }
    }
    unique
}

/// Finds every room of the graph as a counter-clockwise corner cycle.
///
/// Start pairs are visited in corner insertion order, so the returned
/// cycles and their starting corners are deterministic.
#[must_use]
pub fn find_rooms(store: &TopologyStore) -> Vec<Vec<CornerId>> {
    let mut loops = Vec::new();
    for &first in store.corner_ids() {
        for second in store.adjacent_corners(first) {
            loops.push(find_tightest_cycle(store, first, second));
        }
    }
    let discovered = loops.len();

    let unique = remove_duplicate_cycles(loops);
    let unique_count = unique.len();

    let rooms: Vec<Vec<CornerId>> = unique
        .into_iter()
        .filter(|cycle| {
            let points: Vec<Point2> = cycle.iter().map(|&c| position(store, c)).collect();
            !is_clockwise(&points)
        })
        .collect();

    tracing::debug!(
        discovered,
        unique = unique_count,
        rooms = rooms.len(),
        "room discovery finished"
    );
    rooms
}
