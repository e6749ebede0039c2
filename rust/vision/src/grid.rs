// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Row-major sample grid consumed by the Hough stage and the
//! false-intersection filter

use crate::error::{CourtError, Result};
use crate::types::Point;
use image::GrayImage;

/// Answers whether a neighbourhood of the source image holds active samples.
pub trait SampleDensity {
    /// `true` if any non-zero sample lies in the `width` x `height` block
    /// centred on `center`, clipped to the image bounds.
    fn contains_samples_near(&self, center: Point, width: u32, height: u32) -> bool;
}

/// Rectangular field of intensity samples, 0 = background
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleGrid {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl SampleGrid {
    /// Build a grid from row-major samples.
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 || samples.len() != width as usize * height as usize {
            return Err(CourtError::InvalidDimensions {
                width,
                height,
                samples: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Unlike [`new`](Self::new) this accepts zero-sized images, which give
    /// an empty grid with no active samples.
    pub fn from_gray_image(image: &GrayImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            samples: image.as_raw().clone(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `index = y * width + x`; `index` must be below [`len`](Self::len).
    pub fn index_to_coordinate(&self, index: usize) -> Point {
        let width = self.width as usize;
        Point::new((index % width) as i32, (index / width) as i32)
    }

    /// Inverse of [`index_to_coordinate`](Self::index_to_coordinate); `None`
    /// outside the grid.
    pub fn coordinate_to_index(&self, point: Point) -> Option<usize> {
        if !self.contains(point) {
            return None;
        }
        Some(point.y as usize * self.width as usize + point.x as usize)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0
            && point.y >= 0
            && (point.x as u32) < self.width
            && (point.y as u32) < self.height
    }

    /// Coordinates of every non-zero sample, in index order.
    pub fn active_coordinates(&self) -> Vec<Point> {
        self.samples
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s != 0)
            .map(|(i, _)| self.index_to_coordinate(i))
            .collect()
    }

    /// Density query addressed by linear index; `false` past the last sample.
    pub fn block_contains_samples(&self, center_index: usize, width: u32, height: u32) -> bool {
        if center_index >= self.len() {
            return false;
        }
        self.contains_samples_near(self.index_to_coordinate(center_index), width, height)
    }
}

impl SampleDensity for SampleGrid {
    fn contains_samples_near(&self, center: Point, width: u32, height: u32) -> bool {
        let x0 = (center.x as i64 - (width / 2) as i64).max(0);
        let y0 = (center.y as i64 - (height / 2) as i64).max(0);
        let x1 = (center.x as i64 - (width / 2) as i64 + width as i64).min(self.width as i64);
        let y1 = (center.y as i64 - (height / 2) as i64 + height as i64).min(self.height as i64);

        if x0 >= x1 || y0 >= y1 {
            return false;
        }

        let stride = self.width as usize;
        (y0..y1).any(|y| {
            let row = &self.samples[y as usize * stride..(y as usize + 1) * stride];
            row[x0 as usize..x1 as usize].iter().any(|&s| s != 0)
        })
    }
}
