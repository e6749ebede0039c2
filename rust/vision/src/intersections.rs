// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Horizontal/vertical line intersections and false-intersection filtering
//!
//! Lines are addressed by [`LineId`], their index in the deduplicated line
//! list, so map lookups never hash floating-point values.

use crate::grid::SampleDensity;
use crate::types::{BlockSize, Point, PolarLine};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Determinants below this are treated as parallel lines.
const PARALLEL_EPSILON: f64 = 1e-9;

/// Horizontal lines need at least this many intersections to be filtered.
pub const MIN_INTERSECTIONS_FOR_FILTERING: usize = 5;

/// Index of a line in the deduplicated line list
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LineId(pub usize);

/// Ordered crossings of one line with every line of the opposite orientation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineIntersections {
    pub line: LineId,
    pub points: Vec<Point>,
}

/// Both directions of the crossing relation, stored independently
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntersectionMap {
    pub horizontal: Vec<LineIntersections>,
    pub vertical: Vec<LineIntersections>,
}

impl IntersectionMap {
    pub fn horizontal_points(&self, line: LineId) -> Option<&[Point]> {
        self.horizontal
            .iter()
            .find(|entry| entry.line == line)
            .map(|entry| entry.points.as_slice())
    }

    pub fn vertical_points(&self, line: LineId) -> Option<&[Point]> {
        self.vertical
            .iter()
            .find(|entry| entry.line == line)
            .map(|entry| entry.points.as_slice())
    }

    pub fn total_points(&self) -> usize {
        self.horizontal
            .iter()
            .chain(&self.vertical)
            .map(|entry| entry.points.len())
            .sum()
    }
}

/// Split line ids by orientation, preserving input order within each side.
pub fn partition(lines: &[PolarLine]) -> (Vec<LineId>, Vec<LineId>) {
    let mut horizontal = Vec::new();
    let mut vertical = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if line.is_horizontal() {
            horizontal.push(LineId(i));
        } else {
            vertical.push(LineId(i));
        }
    }
    (horizontal, vertical)
}

/// Crossing point of two polar lines, `None` when they are parallel.
///
/// Both coordinates are taken as absolute values and truncated toward zero.
/// Swapping the arguments negates numerator and determinant exactly, so the
/// result is bit-for-bit symmetric and safe for exact point comparison.
pub fn intersect(a: &PolarLine, b: &PolarLine) -> Option<Point> {
    let (st1, ct1) = a.angle.to_radians().sin_cos();
    let (st2, ct2) = b.angle.to_radians().sin_cos();

    let d = ct1 * st2 - st1 * ct2;
    if d.abs() < PARALLEL_EPSILON {
        return None;
    }

    let x = ((st2 * a.distance - st1 * b.distance) / d).abs();
    let y = ((-ct2 * a.distance + ct1 * b.distance) / d).abs();
    Some(Point::new(x as i32, y as i32))
}

fn crossings(lines: &[PolarLine], line: LineId, others: &[LineId]) -> LineIntersections {
    let source = &lines[line.0];
    let points = others
        .iter()
        .filter_map(|other| intersect(source, &lines[other.0]))
        .collect();
    LineIntersections { line, points }
}

/// Intersect every horizontal line with every vertical one, in both directions.
///
/// Each list follows the iteration order of the opposite set. Parallel pairs
/// contribute no point.
pub fn pairwise_intersect(
    lines: &[PolarLine],
    horizontal: &[LineId],
    vertical: &[LineId],
) -> IntersectionMap {
    let horizontal_entries: Vec<LineIntersections> = horizontal
        .par_iter()
        .map(|&id| crossings(lines, id, vertical))
        .collect();
    let vertical_entries: Vec<LineIntersections> = vertical
        .par_iter()
        .map(|&id| crossings(lines, id, horizontal))
        .collect();

    let map = IntersectionMap {
        horizontal: horizontal_entries,
        vertical: vertical_entries,
    };
    tracing::debug!(
        horizontal = horizontal.len(),
        vertical = vertical.len(),
        points = map.total_points(),
        "pairwise intersections"
    );
    map
}

/// Drop outermost horizontal intersections that have no painted line nearby.
///
/// Only lists with at least [`MIN_INTERSECTIONS_FOR_FILTERING`] points are
/// examined. The midpoints of the two leftmost and two rightmost points are
/// both computed before any removal; an empty block around a midpoint
/// removes the corresponding extreme point. Returns the number removed.
pub fn remove_false_horizontal_intersections<D: SampleDensity + ?Sized>(
    map: &mut IntersectionMap,
    density: &D,
    block: BlockSize,
) -> usize {
    let mut removed = 0;
    for entry in &mut map.horizontal {
        let n = entry.points.len();
        if n < MIN_INTERSECTIONS_FOR_FILTERING {
            continue;
        }

        let avg_left = entry.points[0].midpoint(&entry.points[1]);
        let avg_right = entry.points[n - 1].midpoint(&entry.points[n - 2]);
        let left_empty = !density.contains_samples_near(avg_left, block.width, block.height);
        let right_empty = !density.contains_samples_near(avg_right, block.width, block.height);

        if right_empty {
            entry.points.pop();
            removed += 1;
        }
        if left_empty {
            entry.points.remove(0);
            removed += 1;
        }
        if left_empty || right_empty {
            tracing::debug!(
                line = entry.line.0,
                left_empty,
                right_empty,
                remaining = entry.points.len(),
                "removed false intersections"
            );
        }
    }
    removed
}
