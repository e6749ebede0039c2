// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Image loading and binarization ahead of line detection

use crate::error::{CourtError, Result};
use crate::types::Binarization;
use image::{GrayImage, Luma};
use std::path::Path;

/// Width of the headerless 8-bit frames produced by the court camera.
pub const DEFAULT_RAW_WIDTH: u32 = 1392;

/// Height of the headerless 8-bit frames produced by the court camera.
pub const DEFAULT_RAW_HEIGHT: u32 = 550;

/// Load a headerless 8-bit grayscale frame of known dimensions.
///
/// Bytes past `width * height` are ignored; a shorter file is an error.
pub fn load_raw<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<GrayImage> {
    let mut bytes = std::fs::read(path)?;
    let expected = width as usize * height as usize;
    if bytes.len() < expected {
        return Err(CourtError::RawSizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }
    bytes.truncate(expected);

    GrayImage::from_raw(width, height, bytes).ok_or(CourtError::InvalidDimensions {
        width,
        height,
        samples: expected,
    })
}

/// Decode any supported image format and reduce it to luma.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<GrayImage> {
    Ok(image::open(path)?.into_luma8())
}

/// Reduce row-major RGBA bytes to BT.601 luma.
///
/// Pixels the buffer does not fully cover (at least red, green and blue)
/// stay black.
pub fn rgba_to_grayscale(rgba: &[u8], width: u32, height: u32) -> GrayImage {
    let mut gray = GrayImage::new(width, height);

    for (pixel, rgba) in gray.pixels_mut().zip(rgba.chunks(4)) {
        if let [r, g, b, ..] = *rgba {
            let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
            *pixel = Luma([luma as u8]);
        }
    }

    gray
}

/// Pixels strictly above `level` become 255, everything else 0.
pub fn binarize(image: &GrayImage, level: u8) -> GrayImage {
    let mut result = image.clone();
    for pixel in result.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > level { 255 } else { 0 };
    }
    result
}

/// Otsu's optimal threshold level
pub fn otsu_level(image: &GrayImage) -> u8 {
    imageproc::contrast::otsu_level(image)
}

/// Reduce `image` to active/inactive samples as configured.
pub fn apply_binarization(image: &GrayImage, binarization: Binarization) -> GrayImage {
    match binarization {
        Binarization::None => image.clone(),
        Binarization::Fixed(level) => binarize(image, level),
        Binarization::Otsu => {
            let level = otsu_level(image);
            tracing::debug!(level, "otsu threshold");
            binarize(image, level)
        }
    }
}

/// Fraction of non-zero pixels.
pub fn active_fraction(image: &GrayImage) -> f64 {
    let total = image.width() as u64 * image.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let active = image.pixels().filter(|p| p.0[0] != 0).count() as u64;
    active as f64 / total as f64
}
