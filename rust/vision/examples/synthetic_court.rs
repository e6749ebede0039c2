// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Run the court line pipeline on a synthetic frame
//!
//! Run with: cargo run -p courtline-vision --example synthetic_court

use courtline_vision::{
    detect_court_lines_from_image, save_csv, save_overlay, DetectionConfig, OverlayOptions,
};
use image::{GrayImage, Luma};

fn main() {
    println!("=== Synthetic Court Line Detection ===\n");

    // Test 1: Full court
    println!("Test 1: Detect court lines in a synthetic frame...");
    let frame = create_synthetic_court();
    let config = DetectionConfig {
        hough_threshold: 80,
        ..Default::default()
    };

    let detection = detect_court_lines_from_image(&frame, &config);
    println!("  Image size: {}x{}", detection.image_width, detection.image_height);
    println!("  Lines after merging: {}", detection.lines.len());
    println!(
        "  False intersections removed: {}",
        detection.stats.false_intersections_removed
    );

    let segments = detection.final_segments();
    for segment in &segments {
        println!(
            "    {:<20} ({}, {}) -> ({}, {})",
            segment.class.as_str(),
            segment.origin.x,
            segment.origin.y,
            segment.destination.x,
            segment.destination.y
        );
    }
    println!("  ✓ {} court lines classified\n", segments.len());

    // Test 2: Empty frame
    println!("Test 2: Detect court lines in an empty frame...");
    let empty = detect_court_lines_from_image(&GrayImage::new(400, 300), &config);
    println!("  Court lines: {}", empty.final_segments().len());
    println!("  ✓ Empty frame handled\n");

    // Test 3: Export
    println!("Test 3: Export results...");
    let out_dir = std::env::temp_dir();
    let csv_path = out_dir.join("synthetic_court.csv");
    let overlay_path = out_dir.join("synthetic_court.png");
    match save_csv(&csv_path, &segments) {
        Ok(()) => println!("  CSV written to {}", csv_path.display()),
        Err(e) => println!("  CSV export failed: {}", e),
    }
    let options = OverlayOptions {
        markers: true,
        ..Default::default()
    };
    match save_overlay(&overlay_path, &frame, &detection, options) {
        Ok(()) => println!("  Overlay written to {}", overlay_path.display()),
        Err(e) => println!("  Overlay export failed: {}", e),
    }

    println!("\n=== Done ===");
}

/// Near court half as seen from behind the base line
fn create_synthetic_court() -> GrayImage {
    let mut img = GrayImage::new(400, 300);
    let line = Luma([230u8]);

    // Base line
    for x in 40..=360 {
        img.put_pixel(x, 220, line);
    }
    // Service line
    for x in 80..=320 {
        img.put_pixel(x, 130, line);
    }
    // Doubles and singles sidelines
    for x in [40, 80, 320, 360] {
        for y in 40..=220 {
            img.put_pixel(x, y, line);
        }
    }
    // Centre service line
    for y in 40..=130 {
        img.put_pixel(200, y, line);
    }

    img
}
