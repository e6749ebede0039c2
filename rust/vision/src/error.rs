// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for image loading, configuration and export.
//!
//! The detection pipeline itself never fails: missing lines or anchors
//! show up as a shorter segment list. Only the I/O boundary returns these.

/// Result type alias for court line operations.
pub type Result<T> = std::result::Result<T, CourtError>;

/// Errors that can occur around the detection pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CourtError {
    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The image could not be decoded or encoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// A raw buffer is shorter than `width * height`.
    #[error("raw image holds {actual} bytes, expected at least {expected}")]
    RawSizeMismatch { expected: usize, actual: usize },

    /// Width or height of zero, or a sample buffer that does not match them.
    #[error("invalid dimensions {width}x{height} for {samples} samples")]
    InvalidDimensions {
        width: u32,
        height: u32,
        samples: usize,
    },

    /// Configuration or result (de)serialisation failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
