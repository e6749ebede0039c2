// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hough transform: accumulator voting, line extraction and pruning

use crate::grid::SampleGrid;
use crate::types::{
    angle_difference, DetectionConfig, Point, PolarLine, ANGLE_BUCKETS, ANGLE_BUCKET_OFFSET_DEG,
};
use rayon::prelude::*;

/// Vote table indexed by `[distance bucket][angle bucket]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulator {
    distance_buckets: usize,
    votes: Vec<u32>,
}

impl Accumulator {
    fn empty() -> Self {
        Self {
            distance_buckets: 0,
            votes: Vec::new(),
        }
    }

    pub fn distance_buckets(&self) -> usize {
        self.distance_buckets
    }

    pub fn angle_buckets(&self) -> usize {
        ANGLE_BUCKETS
    }

    pub fn is_empty(&self) -> bool {
        self.distance_buckets == 0
    }

    /// Votes at a cell; `0` outside the table.
    pub fn get(&self, distance_bucket: usize, angle_bucket: usize) -> u32 {
        if distance_bucket >= self.distance_buckets || angle_bucket >= ANGLE_BUCKETS {
            return 0;
        }
        self.votes[distance_bucket * ANGLE_BUCKETS + angle_bucket]
    }

    pub fn total_votes(&self) -> u64 {
        self.votes.iter().map(|&v| v as u64).sum()
    }

    pub fn max_votes(&self) -> u32 {
        self.votes.iter().copied().max().unwrap_or(0)
    }

    /// Cells in emission order: distance bucket, then angle bucket.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        self.votes
            .iter()
            .enumerate()
            .map(|(i, &v)| (i / ANGLE_BUCKETS, i % ANGLE_BUCKETS, v))
    }
}

/// Precomputed trigonometry for every angle bucket
struct AngleTable {
    cos: [f64; ANGLE_BUCKETS],
    sin: [f64; ANGLE_BUCKETS],
}

impl AngleTable {
    fn new() -> Self {
        let mut cos = [0.0; ANGLE_BUCKETS];
        let mut sin = [0.0; ANGLE_BUCKETS];
        for bucket in 0..ANGLE_BUCKETS {
            let theta = (bucket as f64 - ANGLE_BUCKET_OFFSET_DEG).to_radians();
            cos[bucket] = theta.cos();
            sin[bucket] = theta.sin();
        }
        Self { cos, sin }
    }

    /// Signed perpendicular distance for a sample at `bucket`.
    ///
    /// The projection runs in the (row, column) frame, so horizontal image
    /// lines vote near bucket 90 and vertical ones near bucket 180.
    #[inline]
    fn project(&self, point: &Point, bucket: usize) -> f64 {
        point.y as f64 * self.cos[bucket] + point.x as f64 * self.sin[bucket]
    }
}

/// Build the Hough accumulator from every non-zero sample of `grid`.
///
/// Negative projections are discarded. The table has `floor(max_d) + 1`
/// distance buckets where `max_d` is the largest kept projection; an empty
/// grid gives an empty table.
pub fn create_accumulator(grid: &SampleGrid) -> Accumulator {
    let coordinates = grid.active_coordinates();
    let table = AngleTable::new();

    let max_distance = coordinates
        .par_iter()
        .map(|point| {
            (0..ANGLE_BUCKETS)
                .map(|bucket| table.project(point, bucket))
                .filter(|&d| d >= 0.0)
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .reduce(|| f64::NEG_INFINITY, f64::max);

    if !max_distance.is_finite() {
        tracing::debug!(samples = coordinates.len(), "no non-negative projections");
        return Accumulator::empty();
    }

    let distance_buckets = max_distance.floor() as usize + 1;

    // One column per angle bucket, each filled by a single task
    let columns: Vec<Vec<u32>> = (0..ANGLE_BUCKETS)
        .into_par_iter()
        .map(|bucket| {
            let mut column = vec![0u32; distance_buckets];
            for point in &coordinates {
                let d = table.project(point, bucket);
                if d >= 0.0 {
                    column[d as usize] += 1;
                }
            }
            column
        })
        .collect();

    let mut votes = vec![0u32; distance_buckets * ANGLE_BUCKETS];
    for (bucket, column) in columns.iter().enumerate() {
        for (d, &count) in column.iter().enumerate() {
            votes[d * ANGLE_BUCKETS + bucket] = count;
        }
    }

    tracing::debug!(
        samples = coordinates.len(),
        distance_buckets,
        "accumulator built"
    );

    Accumulator {
        distance_buckets,
        votes,
    }
}

/// Emit one line per cell with strictly more than `threshold` votes.
///
/// Distance is the bucket index; angle is the bucket index in degrees
/// (not offset). Adjacent cells of one physical line all pass, so the
/// result normally needs [`prune_lines`].
pub fn extract_lines(accumulator: &Accumulator, threshold: u32) -> Vec<PolarLine> {
    accumulator
        .cells()
        .filter(|&(_, _, votes)| votes > threshold)
        .map(|(d, a, _)| PolarLine::new(d as f64, a as f64))
        .collect()
}

/// Tolerances for treating two lines as the same physical line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    pub angle_deg: f64,
    pub distance: f64,
}

impl Default for Similarity {
    fn default() -> Self {
        Self {
            angle_deg: 30.0,
            distance: 15.0,
        }
    }
}

impl From<&DetectionConfig> for Similarity {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            angle_deg: config.similar_angle_deg,
            distance: config.similar_distance,
        }
    }
}

/// Both angle and distance differences strictly below the tolerances.
pub fn is_similar(a: &PolarLine, b: &PolarLine, similarity: &Similarity) -> bool {
    angle_difference(a.angle, b.angle) < similarity.angle_deg
        && (a.distance - b.distance).abs() < similarity.distance
}

/// Collapse clusters of similar lines into one averaged line each.
///
/// Greedy and order dependent: every line absorbs all later lines similar
/// to its running average, which moves with each merge. Outliers inside a
/// cluster skew the average.
pub fn prune_lines(lines: &mut Vec<PolarLine>, similarity: &Similarity) {
    let mut i = 0;
    while i < lines.len() {
        let mut j = i + 1;
        while j < lines.len() {
            if is_similar(&lines[i], &lines[j], similarity) {
                lines[i] = lines[i].averaged_with(&lines[j]);
                lines.remove(j);
            } else {
                j += 1;
            }
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(width: u32, height: u32, active: &[(u32, u32)]) -> SampleGrid {
        let mut samples = vec![0u8; (width * height) as usize];
        for &(x, y) in active {
            samples[(y * width + x) as usize] = 255;
        }
        SampleGrid::new(width, height, samples).unwrap()
    }

    #[test]
    fn test_empty_grid_gives_empty_accumulator() {
        let grid = grid_with(10, 10, &[]);
        let accumulator = create_accumulator(&grid);
        assert!(accumulator.is_empty());
        assert_eq!(accumulator.max_votes(), 0);
        assert!(extract_lines(&accumulator, 0).is_empty());
    }

    #[test]
    fn test_vote_conservation() {
        let active = [(3, 4), (10, 2), (0, 0), (7, 7), (19, 11)];
        let grid = grid_with(20, 12, &active);
        let accumulator = create_accumulator(&grid);

        let table = AngleTable::new();
        let expected: u64 = grid
            .active_coordinates()
            .iter()
            .map(|p| {
                (0..ANGLE_BUCKETS)
                    .filter(|&b| table.project(p, b) >= 0.0)
                    .count() as u64
            })
            .sum();

        assert_eq!(accumulator.total_votes(), expected);
        assert_eq!(accumulator.angle_buckets(), 270);
    }

    #[test]
    fn test_distance_bucket_count() {
        // Row 5 projects to exactly 5 at bucket 90
        let grid = grid_with(10, 10, &[(0, 5)]);
        let accumulator = create_accumulator(&grid);
        assert_eq!(accumulator.distance_buckets(), 5 + 1);
    }

    #[test]
    fn test_horizontal_and_vertical_peaks() {
        let mut active = Vec::new();
        for x in 5..45 {
            active.push((x, 20));
        }
        for y in 2..38 {
            active.push((30, y));
        }
        let grid = grid_with(50, 40, &active);
        let accumulator = create_accumulator(&grid);

        // Row 20 votes at bucket 90, column 30 at bucket 180
        assert_eq!(accumulator.get(20, 90), 40);
        assert_eq!(accumulator.get(30, 180), 36);
        assert_eq!(accumulator.max_votes(), 40);

        let mut lines = extract_lines(&accumulator, 30);
        assert!(lines.contains(&PolarLine::new(20.0, 90.0)));
        assert!(lines.contains(&PolarLine::new(30.0, 180.0)));
        assert!(lines.len() > 2);

        prune_lines(&mut lines, &Similarity::default());
        assert_eq!(lines.len(), 2);
        let horizontal = lines.iter().find(|l| l.is_horizontal()).unwrap();
        let vertical = lines.iter().find(|l| l.is_vertical()).unwrap();
        assert!((horizontal.distance - 20.0).abs() < 2.0);
        assert!((horizontal.angle - 90.0).abs() < 3.0);
        assert!((vertical.distance - 30.0).abs() < 2.0);
        assert!((vertical.angle - 180.0).abs() < 3.0);
    }

    #[test]
    fn test_extract_is_strictly_greater() {
        let grid = grid_with(10, 10, &[(1, 1), (2, 1), (3, 1)]);
        let accumulator = create_accumulator(&grid);
        assert_eq!(accumulator.get(1, 90), 3);
        assert!(extract_lines(&accumulator, 3).is_empty());
        assert!(extract_lines(&accumulator, 2).contains(&PolarLine::new(1.0, 90.0)));
    }

    #[test]
    fn test_is_similar() {
        let similarity = Similarity::default();
        let a = PolarLine::new(100.0, 90.0);
        assert!(is_similar(&a, &PolarLine::new(114.0, 119.0), &similarity));
        assert!(!is_similar(&a, &PolarLine::new(115.0, 90.0), &similarity));
        assert!(!is_similar(&a, &PolarLine::new(100.0, 120.0), &similarity));
    }

    #[test]
    fn test_prune_averages_cluster() {
        let mut lines = vec![
            PolarLine::new(100.0, 90.0),
            PolarLine::new(300.0, 180.0),
            PolarLine::new(102.0, 92.0),
        ];
        prune_lines(&mut lines, &Similarity::default());
        assert_eq!(
            lines,
            vec![PolarLine::new(101.0, 91.0), PolarLine::new(300.0, 180.0)]
        );
    }

    #[test]
    fn test_prune_running_average_is_order_dependent() {
        let similarity = Similarity::default();
        let mut forward = vec![
            PolarLine::new(0.0, 90.0),
            PolarLine::new(14.0, 90.0),
            PolarLine::new(20.0, 90.0),
        ];
        prune_lines(&mut forward, &similarity);
        // (0 + 14) / 2 = 7 is within 15 of 20
        assert_eq!(forward, vec![PolarLine::new(13.5, 90.0)]);

        let mut reversed = vec![
            PolarLine::new(20.0, 90.0),
            PolarLine::new(0.0, 90.0),
            PolarLine::new(14.0, 90.0),
        ];
        prune_lines(&mut reversed, &similarity);
        assert_eq!(
            reversed,
            vec![PolarLine::new(17.0, 90.0), PolarLine::new(0.0, 90.0)]
        );
    }

    #[test]
    fn test_prune_converges_on_clustered_lines() {
        let similarity = Similarity::default();
        let mut lines = Vec::new();
        for center in [(40.0, 180.0), (150.0, 90.0), (250.0, 90.0), (320.0, 180.0)] {
            for dd in [-2.0, 0.0, 1.0, 3.0] {
                for da in [-1.0, 0.0, 2.0] {
                    lines.push(PolarLine::new(center.0 + dd, center.1 + da));
                }
            }
        }
        lines.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        prune_lines(&mut lines, &similarity);
        assert_eq!(lines.len(), 4);

        let once = lines.clone();
        prune_lines(&mut lines, &similarity);
        assert_eq!(lines, once);

        for (i, a) in lines.iter().enumerate() {
            for b in &lines[i + 1..] {
                assert!(!is_similar(a, b, &similarity));
            }
        }
    }
}
