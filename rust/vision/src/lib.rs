// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tennis court line detection and classification
//!
//! This crate provides a complete pipeline for:
//! 1. Binarizing a camera frame into a sample grid
//! 2. Detecting straight lines with a Hough transform and merging duplicates
//! 3. Intersecting horizontal and vertical lines, dropping crossings with no
//!    painted line nearby
//! 4. Naming base, service, centre service and side lines from those crossings
//!
//! # Usage
//!
//! ```rust,ignore
//! use courtline_vision::{detect_court_lines_from_image, load_raw, DetectionConfig};
//!
//! let frame = load_raw("court.raw", 1392, 550)?;
//! let detection = detect_court_lines_from_image(&frame, &DetectionConfig::default());
//!
//! for segment in detection.final_segments() {
//!     println!("{} {:?} -> {:?}", segment.class, segment.origin, segment.destination);
//! }
//! ```

pub mod classifier;
pub mod error;
pub mod export;
pub mod grid;
pub mod hough;
pub mod image_ops;
pub mod intersections;
pub mod overlay;
pub mod types;

// Re-export commonly used types and functions
pub use classifier::{classify_horizontal, classify_vertical, final_segments};
pub use error::{CourtError, Result};
pub use export::{save_csv, save_json, write_csv};
pub use grid::{SampleDensity, SampleGrid};
pub use hough::{create_accumulator, extract_lines, prune_lines, Accumulator, Similarity};
pub use image_ops::{apply_binarization, load_image, load_raw, rgba_to_grayscale};
pub use intersections::{
    intersect, pairwise_intersect, partition, remove_false_horizontal_intersections,
    IntersectionMap, LineId,
};
pub use overlay::{render_overlay, save_overlay, OverlayOptions};
pub use types::{
    Binarization, BlockSize, ClassifiedSegment, CourtDetection, DetectionConfig, DetectionStats,
    LineClass, Point, PolarLine,
};

use image::GrayImage;

/// Run the full detection pipeline over an already binarized sample grid.
///
/// Never fails: an empty grid, a threshold nothing passes or a court with
/// missing lines all yield a detection with fewer (possibly zero) segments.
pub fn detect_court_lines(grid: &SampleGrid, config: &DetectionConfig) -> CourtDetection {
    let mut stats = DetectionStats::default();

    // Step 1: Vote
    let accumulator = create_accumulator(grid);
    stats.active_samples = grid.samples().iter().filter(|&&s| s != 0).count();
    stats.distance_buckets = accumulator.distance_buckets();

    // Step 2: Threshold and merge near-duplicates
    let mut lines = extract_lines(&accumulator, config.hough_threshold);
    let peak_votes = accumulator.max_votes();
    drop(accumulator);
    stats.raw_lines = lines.len();
    prune_lines(&mut lines, &Similarity::from(config));
    stats.pruned_lines = lines.len();

    // Step 3: Intersect
    let (horizontal, vertical) = partition(&lines);
    stats.horizontal_lines = horizontal.len();
    stats.vertical_lines = vertical.len();
    let mut intersections = pairwise_intersect(&lines, &horizontal, &vertical);

    // Step 4: Drop crossings with no painted line around them
    stats.false_intersections_removed =
        remove_false_horizontal_intersections(&mut intersections, grid, config.density_block);

    // Step 5: Classify horizontals, then verticals against their anchors
    let horizontal_classes = classify_horizontal(&intersections);
    let segments = classify_vertical(&intersections, &horizontal_classes);
    stats.segments = segments.len();

    tracing::info!(
        raw_lines = stats.raw_lines,
        lines = stats.pruned_lines,
        horizontal = stats.horizontal_lines,
        vertical = stats.vertical_lines,
        false_intersections = stats.false_intersections_removed,
        segments = stats.segments,
        "court lines detected"
    );
    if lines.is_empty() {
        tracing::warn!(
            threshold = config.hough_threshold,
            peak_votes,
            active_samples = stats.active_samples,
            "no line passed the hough threshold"
        );
    }

    CourtDetection {
        lines,
        intersections,
        segments,
        stats,
        image_width: grid.width(),
        image_height: grid.height(),
    }
}

/// Binarize a grayscale frame as configured, then detect court lines.
pub fn detect_court_lines_from_image(
    image: &GrayImage,
    config: &DetectionConfig,
) -> CourtDetection {
    let binary = apply_binarization(image, config.binarization);
    let grid = SampleGrid::from_gray_image(&binary);
    detect_court_lines(&grid, config)
}

/// Convert RGBA pixels to grayscale and detect court lines.
pub fn detect_court_lines_from_rgba(
    rgba_data: &[u8],
    width: u32,
    height: u32,
    config: &DetectionConfig,
) -> CourtDetection {
    let grayscale = rgba_to_grayscale(rgba_data, width, height);
    detect_court_lines_from_image(&grayscale, config)
}
