//! Alignment padding: place an image inside a larger transparent canvas.
//!
//! Two renditions of the same picture often differ in size (a canvas was
//! extended, a screenshot cropped). Before a position-wise comparison both
//! have to share dimensions, so each is padded to the mutual size with
//! its content placed at the chosen [`Anchor`].

use crate::anchor::Anchor;
use crate::types::{BYTES_PER_PIXEL, Dimensions, RgbaImage};

/// Pad `image` to `desired`, positioning it at `anchor`.
///
/// The output is always exactly `desired.width × desired.height`,
/// zero-initialized (transparent black), with every source pixel copied
/// byte for byte into the anchored region. The input is never aliased.
///
/// # Panics
///
/// Panics if `image` is larger than `desired` on either axis. That is a
/// caller bug in the alignment pipeline, not a runtime condition.
#[must_use = "returns the padded image"]
pub fn pad_image(image: &RgbaImage, desired: Dimensions, anchor: Anchor) -> RgbaImage {
    let actual = Dimensions::of(image);
    assert!(
        actual.fits_within(desired),
        "cannot pad {}x{} image into {}x{} canvas",
        actual.width,
        actual.height,
        desired.width,
        desired.height,
    );

    let top = anchor.vertical.offset(actual.height, desired.height) as usize;
    let left = anchor.horizontal.offset(actual.width, desired.width) as usize;

    let mut padded = RgbaImage::new(desired.width, desired.height);
    let src_stride = actual.width as usize * BYTES_PER_PIXEL;
    let dst_stride = desired.width as usize * BYTES_PER_PIXEL;
    if src_stride == 0 {
        return padded;
    }

    let src = image.as_raw();
    let dst: &mut [u8] = &mut padded;
    for (row, src_row) in src.chunks_exact(src_stride).enumerate() {
        let start = (top + row) * dst_stride + left * BYTES_PER_PIXEL;
        dst[start..start + src_stride].copy_from_slice(src_row);
    }

    padded
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Rgba;

    use super::*;
    use crate::anchor::{HorizontalAlign, VerticalAlign};

    /// Every pixel unique and fully non-zero so misplaced or dropped
    /// bytes are visible.
    fn patterned(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([x as u8 + 1, y as u8 + 1, 0xA5, 0xFF])
        })
    }

    fn assert_placed(padded: &RgbaImage, source: &RgbaImage, top: u32, left: u32) {
        for y in 0..padded.height() {
            for x in 0..padded.width() {
                let inside = y >= top
                    && y < top + source.height()
                    && x >= left
                    && x < left + source.width();
                let got = padded.get_pixel(x, y);
                if inside {
                    assert_eq!(got, source.get_pixel(x - left, y - top), "at ({x}, {y})");
                } else {
                    assert_eq!(got.0, [0, 0, 0, 0], "padding at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn top_left_copies_into_origin() {
        let src = patterned(3, 2);
        let padded = pad_image(&src, Dimensions::new(5, 4), Anchor::default());
        assert_eq!(padded.dimensions(), (5, 4));
        assert_placed(&padded, &src, 0, 0);
    }

    #[test]
    fn bottom_center_pads_above() {
        let src = patterned(10, 10);
        let anchor = Anchor::new(VerticalAlign::Bottom, HorizontalAlign::Center);
        let padded = pad_image(&src, Dimensions::new(10, 12), anchor);
        assert_eq!(padded.dimensions(), (10, 12));
        // Rows [2..12), columns [0..10).
        assert_placed(&padded, &src, 2, 0);
    }

    #[test]
    fn middle_rounds_down_on_odd_slack() {
        let src = patterned(2, 2);
        let anchor = Anchor::new(VerticalAlign::Middle, HorizontalAlign::Center);
        let padded = pad_image(&src, Dimensions::new(5, 5), anchor);
        assert_placed(&padded, &src, 1, 1);
    }

    #[test]
    fn every_anchor_yields_exact_size() {
        let src = patterned(4, 3);
        let desired = Dimensions::new(9, 7);
        for anchor in Anchor::ALL {
            let padded = pad_image(&src, desired, anchor);
            assert_eq!(padded.as_raw().len(), 9 * 7 * BYTES_PER_PIXEL);
            let top = anchor.vertical.offset(3, 7);
            let left = anchor.horizontal.offset(4, 9);
            assert_placed(&padded, &src, top, left);
        }
    }

    #[test]
    fn same_size_is_a_copy() {
        let src = patterned(6, 6);
        let padded = pad_image(&src, Dimensions::new(6, 6), Anchor::default());
        assert_eq!(padded, src);
        assert_ne!(padded.as_raw().as_ptr(), src.as_raw().as_ptr());
    }

    #[test]
    fn bytes_are_not_colour_converted() {
        // Semi-transparent pixels must be copied verbatim, not premultiplied.
        let src = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 7]));
        let padded = pad_image(&src, Dimensions::new(2, 2), Anchor::default());
        assert_eq!(padded.get_pixel(0, 0).0, [200, 100, 50, 7]);
    }

    #[test]
    fn zero_width_source_gives_blank_canvas() {
        let src = RgbaImage::new(0, 3);
        let padded = pad_image(&src, Dimensions::new(2, 3), Anchor::default());
        assert!(padded.as_raw().iter().all(|&b| b == 0));
    }

    #[test]
    #[should_panic(expected = "cannot pad")]
    fn oversized_source_panics() {
        let src = patterned(4, 4);
        let _ = pad_image(&src, Dimensions::new(3, 4), Anchor::default());
    }
}
