//! imgdiff-engine: Pure image alignment and diff engine (sans-IO).
//!
//! Given two renditions of the same image, possibly of different sizes,
//! produces a pixel-accurate diff image, a differing-pixel count, and,
//! when the sizes differ, the padded "main" image so callers can render
//! an aligned composite:
//!
//! decode -> pad to mutual size at an anchor -> pixel diff.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and images. Document handling and pairing live in
//! `imgdiff-link`.

pub mod anchor;
pub mod codec;
pub mod pad;
pub mod pixel;
pub mod types;

pub use anchor::{Anchor, HorizontalAlign, ParseAnchorError, VerticalAlign};
pub use codec::{decode, encode_png};
pub use pad::pad_image;
pub use pixel::diff_pixels;
pub use types::{DiffError, DiffOptions, DiffResult, Dimensions, PixelDiff, RgbaImage};

/// Diff `base` against `main` with the default exact-comparison options.
///
/// See [`compute_diff_with`].
#[must_use = "returns the diff result"]
pub fn compute_diff(base: &RgbaImage, main: &RgbaImage, anchor: Anchor) -> DiffResult {
    compute_diff_with(base, main, anchor, &DiffOptions::default())
}

/// Diff `base` (the origin side) against `main` (the live/changed side).
///
/// Equal-size inputs are compared directly and no aligned image is
/// returned. Otherwise both images are padded to
/// `max(width) × max(height)` at `anchor`, the padded pair is compared,
/// and the padded `main` image is returned as
/// [`DiffResult::aligned_image`].
#[must_use = "returns the diff result"]
pub fn compute_diff_with(
    base: &RgbaImage,
    main: &RgbaImage,
    anchor: Anchor,
    options: &DiffOptions,
) -> DiffResult {
    if base.dimensions() == main.dimensions() {
        let PixelDiff {
            diff_image,
            diff_pixel_count,
        } = diff_pixels(base, main, options);
        return DiffResult {
            diff_image,
            diff_pixel_count,
            aligned_image: None,
        };
    }

    let mutual = Dimensions::of(base).union(Dimensions::of(main));
    let padded_base = pad_image(base, mutual, anchor);
    let padded_main = pad_image(main, mutual, anchor);
    let PixelDiff {
        diff_image,
        diff_pixel_count,
    } = diff_pixels(&padded_base, &padded_main, options);

    DiffResult {
        diff_image,
        diff_pixel_count,
        aligned_image: Some(padded_main),
    }
}

/// Decode both inputs and diff them.
///
/// # Errors
///
/// Returns the first decode failure ([`DiffError::EmptyInput`] or
/// [`DiffError::ImageDecode`]). Callers are expected to skip the diff
/// and show whichever image is available.
pub fn diff_encoded(
    base: &[u8],
    main: &[u8],
    anchor: Anchor,
    options: &DiffOptions,
) -> Result<DiffResult, DiffError> {
    let base = decode(base)?;
    let main = decode(main)?;
    Ok(compute_diff_with(&base, &main, anchor, options))
}
