// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Debug overlay rendering of detected court lines

use crate::error::Result;
use crate::types::{ClassifiedSegment, CourtDetection, LineClass};
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_line_segment_mut};
use imageproc::map::map_colors;
use std::path::Path;

const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
const FOREGROUND: Rgb<u8> = Rgb([90, 90, 90]);
const RAW_LINE: Rgb<u8> = Rgb([60, 60, 160]);
const MARKER: Rgb<u8> = Rgb([255, 255, 255]);

/// What to draw besides the classified segments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayOptions {
    /// Cross at every filtered intersection
    pub markers: bool,
    /// Every deduplicated polar line, clipped to the image
    pub raw_lines: bool,
    /// Internal anchor segments as well as the final ones
    pub internal_segments: bool,
}

pub fn class_color(class: LineClass) -> Rgb<u8> {
    match class {
        LineClass::BaseLine => Rgb([255, 64, 64]),
        LineClass::ServiceLine => Rgb([64, 160, 255]),
        LineClass::CentreServiceLine => Rgb([255, 220, 0]),
        LineClass::SinglesSideline => Rgb([64, 255, 64]),
        LineClass::DoublesSideline => Rgb([255, 64, 255]),
        LineClass::InnerBaseLine | LineClass::ServiceLineHalf | LineClass::Unknown => {
            Rgb([160, 160, 160])
        }
    }
}

fn draw_segment(canvas: &mut RgbImage, segment: &ClassifiedSegment, color: Rgb<u8>) {
    draw_line_segment_mut(
        canvas,
        (segment.origin.x as f32, segment.origin.y as f32),
        (segment.destination.x as f32, segment.destination.y as f32),
        color,
    );
}

/// Draw the detection over a dimmed copy of the sample image.
pub fn render_overlay(
    image: &GrayImage,
    detection: &CourtDetection,
    options: OverlayOptions,
) -> RgbImage {
    let mut canvas = map_colors(image, |p| if p[0] > 0 { FOREGROUND } else { BACKGROUND });

    if options.raw_lines {
        for line in &detection.lines {
            if let Some(segment) = line.to_segment(image.width(), image.height()) {
                draw_segment(&mut canvas, &segment, RAW_LINE);
            }
        }
    }

    for segment in &detection.segments {
        if segment.class.is_internal() && !options.internal_segments {
            continue;
        }
        draw_segment(&mut canvas, segment, class_color(segment.class));
    }

    if options.markers {
        let map = &detection.intersections;
        for point in map.horizontal.iter().flat_map(|entry| &entry.points) {
            draw_cross_mut(&mut canvas, MARKER, point.x, point.y);
        }
    }

    canvas
}

pub fn save_overlay<P: AsRef<Path>>(
    path: P,
    image: &GrayImage,
    detection: &CourtDetection,
    options: OverlayOptions,
) -> Result<()> {
    render_overlay(image, detection, options).save(path)?;
    Ok(())
}
