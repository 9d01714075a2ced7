//! Shared types for the imgdiff engine.

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can hold decoded images
/// without depending on `image` directly.
pub use image::RgbaImage;

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Dimensions of an existing image.
    #[must_use]
    pub fn of(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }

    /// The smallest dimensions that contain both `self` and `other`.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Returns `true` if an image of these dimensions fits inside `outer`.
    #[must_use]
    pub const fn fits_within(self, outer: Self) -> bool {
        self.width <= outer.width && self.height <= outer.height
    }

    /// Total number of pixels.
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Errors that can occur while decoding or encoding images.
///
/// None of these are raised past the diff boundary: callers that receive
/// one skip the diff and render whatever image is available.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// Zero-length input. The host uses this to signal that the content
    /// is not available yet (e.g. an empty blob for a deleted file).
    #[error("input image data is empty")]
    EmptyInput,

    /// The bytes are not a recognized or valid image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// PNG encoding of an output image failed.
    #[error("failed to encode image: {0}")]
    ImageEncode(String),
}

/// Tuning for the pixel comparison.
///
/// Defaults are exact comparison: zero colour threshold, anti-aliased
/// pixels counted like any other difference, and matching pixels drawn
/// as a faint grayscale of the first image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Matching threshold in `0.0..=1.0`. Smaller is more sensitive;
    /// `0.0` requires an exact colour match.
    pub threshold: f64,

    /// When `true`, anti-aliased pixels are counted as differences.
    /// When `false`, the anti-aliasing detector runs and detected pixels
    /// are painted with [`anti_aliased_color`](Self::anti_aliased_color)
    /// without being counted.
    pub include_anti_aliasing: bool,

    /// Opacity of the original image drawn under matching pixels.
    pub alpha: f64,

    /// Colour of detected anti-aliased pixels.
    pub anti_aliased_color: [u8; 3],

    /// Colour of differing pixels.
    pub diff_color: [u8; 3],

    /// Colour of differing pixels that are darker in the second image.
    /// Falls back to [`diff_color`](Self::diff_color) when unset.
    pub diff_color_alt: Option<[u8; 3]>,

    /// Draw only the differences on a transparent background.
    pub diff_mask: bool,
}

impl DiffOptions {
    /// Default matching threshold.
    pub const DEFAULT_THRESHOLD: f64 = 0.0;

    /// Default anti-aliasing handling.
    pub const DEFAULT_INCLUDE_ANTI_ALIASING: bool = true;

    /// Default opacity of unchanged pixels in the diff image.
    pub const DEFAULT_ALPHA: f64 = 0.1;

    /// Default colour of anti-aliased pixels (yellow).
    pub const DEFAULT_ANTI_ALIASED_COLOR: [u8; 3] = [255, 255, 0];

    /// Default colour of differing pixels (red).
    pub const DEFAULT_DIFF_COLOR: [u8; 3] = [255, 0, 0];
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            include_anti_aliasing: Self::DEFAULT_INCLUDE_ANTI_ALIASING,
            alpha: Self::DEFAULT_ALPHA,
            anti_aliased_color: Self::DEFAULT_ANTI_ALIASED_COLOR,
            diff_color: Self::DEFAULT_DIFF_COLOR,
            diff_color_alt: None,
            diff_mask: false,
        }
    }
}

/// Output of a pixel comparison between two equal-size images.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelDiff {
    /// Highlighted differences, same size as the inputs.
    pub diff_image: RgbaImage,
    /// Number of pixels counted as different.
    pub diff_pixel_count: u64,
}

/// Output of [`compute_diff`](crate::compute_diff).
#[derive(Debug, Clone, PartialEq)]
pub struct DiffResult {
    /// Highlighted differences at the mutual size of both inputs.
    pub diff_image: RgbaImage,
    /// Number of pixels counted as different.
    pub diff_pixel_count: u64,
    /// The padded main (changed) image, present only when the inputs had
    /// different dimensions and had to be aligned.
    pub aligned_image: Option<RgbaImage>,
}

impl DiffResult {
    /// Dimensions of the diff image.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::of(&self.diff_image)
    }

    /// Returns `true` if no pixel was counted as different.
    #[must_use]
    pub const fn is_identical(&self) -> bool {
        self.diff_pixel_count == 0
    }
}
