// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for court line detection and classification

use crate::error::Result;
use crate::intersections::IntersectionMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of discrete angle buckets in the accumulator (1 degree each).
pub const ANGLE_BUCKETS: usize = 270;

/// Offset between an angle bucket index and the voting angle in degrees.
pub const ANGLE_BUCKET_OFFSET_DEG: f64 = 90.0;

/// Integer pixel coordinate (x = column, y = row)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Integer midpoint, truncating towards zero.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2, (self.y + other.y) / 2)
    }
}

/// Orientation of a polar line, derived from its angle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Smallest angle between two directions in degrees, wrapping at 360.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

/// Infinite line in polar form.
///
/// `angle` is expressed in accumulator bucket degrees: bucket `j` was voted
/// with the perpendicular at `j - 90` degrees in the (row, column) frame,
/// which places a point `(x, y)` of the line on `-x·cos(angle) + y·sin(angle) = distance`.
/// Horizontal court lines sit near 90, vertical ones near 180.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PolarLine {
    pub distance: f64,
    pub angle: f64,
}

impl PolarLine {
    pub fn new(distance: f64, angle: f64) -> Self {
        Self { distance, angle }
    }

    /// Vertical when the angle lies outside the open interval (45, 150).
    pub fn orientation(&self) -> Orientation {
        if self.angle > 45.0 && self.angle < 150.0 {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    pub fn is_vertical(&self) -> bool {
        self.orientation() == Orientation::Vertical
    }

    pub fn is_horizontal(&self) -> bool {
        self.orientation() == Orientation::Horizontal
    }

    /// Element-wise mean of distance and angle.
    pub fn averaged_with(&self, other: &PolarLine) -> PolarLine {
        PolarLine::new(
            (self.distance + other.distance) / 2.0,
            (self.angle + other.angle) / 2.0,
        )
    }

    /// Distance parameter of the line with this angle passing through `point`.
    ///
    /// Equals `self.distance` for points on the line.
    pub fn project(&self, point: &Point) -> f64 {
        let (sin_t, cos_t) = self.angle.to_radians().sin_cos();
        -(point.x as f64) * cos_t + point.y as f64 * sin_t
    }

    /// Clip the infinite line to the image rectangle.
    ///
    /// Returns `None` when the line misses the image. The segment is tagged
    /// [`LineClass::Unknown`].
    pub fn to_segment(&self, width: u32, height: u32) -> Option<ClassifiedSegment> {
        let (sin_t, cos_t) = self.angle.to_radians().sin_cos();
        let max_x = width.saturating_sub(1) as f64;
        let max_y = height.saturating_sub(1) as f64;

        let mut ends: Vec<(f64, f64)> = Vec::with_capacity(4);

        // Left and right borders
        if sin_t.abs() > 1e-6 {
            for x in [0.0, max_x] {
                let y = (self.distance + x * cos_t) / sin_t;
                if (0.0..=max_y).contains(&y) {
                    ends.push((x, y));
                }
            }
        }

        // Top and bottom borders
        if cos_t.abs() > 1e-6 {
            for y in [0.0, max_y] {
                let x = (y * sin_t - self.distance) / cos_t;
                if (0.0..=max_x).contains(&x) {
                    ends.push((x, y));
                }
            }
        }

        let first = *ends.first()?;
        let last = ends
            .iter()
            .copied()
            .find(|&(x, y)| (x - first.0).abs() > 0.5 || (y - first.1).abs() > 0.5)?;

        Some(ClassifiedSegment::new(
            LineClass::Unknown,
            Point::new(first.0.round() as i32, first.1.round() as i32),
            Point::new(last.0.round() as i32, last.1.round() as i32),
        ))
    }
}

/// Semantic role of a court line segment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineClass {
    Unknown,
    BaseLine,
    /// Base line between the two singles sidelines
    InnerBaseLine,
    ServiceLine,
    /// Service line from the centre service line crossing to its origin
    ServiceLineHalf,
    CentreServiceLine,
    SinglesSideline,
    DoublesSideline,
}

impl LineClass {
    /// Classes that only exist to anchor the vertical pass.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            LineClass::Unknown | LineClass::InnerBaseLine | LineClass::ServiceLineHalf
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineClass::Unknown => "UNKNOWN",
            LineClass::BaseLine => "BASE_LINE",
            LineClass::InnerBaseLine => "INNER_BASE_LINE",
            LineClass::ServiceLine => "SERVICE_LINE",
            LineClass::ServiceLineHalf => "SERVICE_LINE_HALF",
            LineClass::CentreServiceLine => "CENTRE_SERVICE_LINE",
            LineClass::SinglesSideline => "SINGLES_SIDELINE",
            LineClass::DoublesSideline => "DOUBLES_SIDELINE",
        }
    }
}

impl std::fmt::Display for LineClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line segment with a classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifiedSegment {
    pub class: LineClass,
    pub origin: Point,
    pub destination: Point,
}

impl ClassifiedSegment {
    pub fn new(class: LineClass, origin: Point, destination: Point) -> Self {
        Self {
            class,
            origin,
            destination,
        }
    }
}

/// How the input image is reduced to active/inactive samples
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Binarization {
    /// Use the samples as they are (any non-zero value is active)
    None,
    /// Samples strictly above the level become active
    Fixed(u8),
    /// Level chosen with Otsu's method
    Otsu,
}

/// Neighbourhood probed around a candidate intersection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockSize {
    pub width: u32,
    pub height: u32,
}

impl Default for BlockSize {
    fn default() -> Self {
        Self {
            width: 20,
            height: 50,
        }
    }
}

/// Configuration for the court line detection pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    /// Reduction of the grayscale input to a binary sample grid
    pub binarization: Binarization,
    /// Accumulator cells strictly above this vote count become lines
    pub hough_threshold: u32,
    /// Angular tolerance for merging near-identical lines (degrees)
    pub similar_angle_deg: f64,
    /// Distance tolerance for merging near-identical lines (pixels)
    pub similar_distance: f64,
    /// Neighbourhood used to reject false horizontal intersections
    pub density_block: BlockSize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            binarization: Binarization::Fixed(150),
            hough_threshold: 200,
            similar_angle_deg: 30.0,
            similar_distance: 15.0,
            density_block: BlockSize::default(),
        }
    }
}

impl DetectionConfig {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Counters collected while running the pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetectionStats {
    pub active_samples: usize,
    pub distance_buckets: usize,
    pub raw_lines: usize,
    pub pruned_lines: usize,
    pub horizontal_lines: usize,
    pub vertical_lines: usize,
    pub false_intersections_removed: usize,
    pub segments: usize,
}

/// Complete detection result for one image
#[derive(Debug, Clone, Serialize)]
pub struct CourtDetection {
    /// Deduplicated polar lines; `LineId`s index into this list
    pub lines: Vec<PolarLine>,
    /// Intersections after false-intersection filtering
    pub intersections: IntersectionMap,
    /// All classified segments, internal anchors included
    pub segments: Vec<ClassifiedSegment>,
    pub stats: DetectionStats,
    pub image_width: u32,
    pub image_height: u32,
}

impl CourtDetection {
    /// Segments with user-facing classes only.
    pub fn final_segments(&self) -> Vec<ClassifiedSegment> {
        crate::classifier::final_segments(&self.segments)
    }
}
