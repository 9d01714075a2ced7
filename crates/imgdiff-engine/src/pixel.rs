//! Pixel-level comparison of two equal-size images.
//!
//! The comparison follows the `pixelmatch` algorithm: per-pixel colour
//! distance is measured in YIQ space after blending translucent pixels
//! onto white, and (optionally) pixels that only differ because of
//! anti-aliased edges are detected and left out of the count.
//!
//! With the default [`DiffOptions`] the threshold is zero, so any colour
//! change counts, and anti-aliased pixels are counted too.

use crate::types::{BYTES_PER_PIXEL, DiffOptions, PixelDiff, RgbaImage};

/// Maximum possible YIQ delta between any two colours.
const MAX_YIQ_DELTA: f64 = 35215.0;

/// Compare `a` against `b` pixel by pixel.
///
/// Matching pixels are drawn as a faint grayscale of `a` (opacity
/// [`DiffOptions::alpha`]); differing pixels are painted with
/// [`DiffOptions::diff_color`].
///
/// # Panics
///
/// Panics if the two images differ in size. Callers must pad first
/// (see [`pad_image`](crate::pad::pad_image)).
#[must_use = "returns the diff image and count"]
pub fn diff_pixels(a: &RgbaImage, b: &RgbaImage, options: &DiffOptions) -> PixelDiff {
    assert!(
        a.dimensions() == b.dimensions(),
        "cannot diff {}x{} against {}x{}; pad both images first",
        a.width(),
        a.height(),
        b.width(),
        b.height(),
    );

    let (width, height) = a.dimensions();
    let img1 = a.as_raw();
    let img2 = b.as_raw();
    let mut output = RgbaImage::new(width, height);

    // Identical buffers: no need to measure anything.
    if img1 == img2 {
        if !options.diff_mask {
            let out: &mut [u8] = &mut output;
            for pos in (0..img1.len()).step_by(BYTES_PER_PIXEL) {
                draw_gray_pixel(img1, pos, options.alpha, out);
            }
        }
        return PixelDiff {
            diff_image: output,
            diff_pixel_count: 0,
        };
    }

    let max_delta = MAX_YIQ_DELTA * options.threshold * options.threshold;
    let diff_color_alt = options.diff_color_alt.unwrap_or(options.diff_color);
    let grid = Grid { width, height };
    let out: &mut [u8] = &mut output;
    let mut count = 0_u64;

    for y in 0..height {
        for x in 0..width {
            let pos = grid.offset(x, y);
            let delta = color_delta(img1, img2, pos, pos, false);

            if delta.abs() > max_delta {
                let anti_aliased = !options.include_anti_aliasing
                    && (grid.anti_aliased(img1, img2, x, y) || grid.anti_aliased(img2, img1, x, y));
                if anti_aliased {
                    if !options.diff_mask {
                        draw_pixel(out, pos, options.anti_aliased_color);
                    }
                } else {
                    let color = if delta < 0.0 {
                        diff_color_alt
                    } else {
                        options.diff_color
                    };
                    draw_pixel(out, pos, color);
                    count += 1;
                }
            } else if !options.diff_mask {
                draw_gray_pixel(img1, pos, options.alpha, out);
            }
        }
    }

    PixelDiff {
        diff_image: output,
        diff_pixel_count: count,
    }
}

#[derive(Clone, Copy)]
struct Grid {
    width: u32,
    height: u32,
}

impl Grid {
    const fn offset(self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }

    /// Clamped 3x3 neighbourhood bounds around `(x, y)`, plus whether the
    /// pixel sits on the image border.
    fn neighbourhood(self, x: u32, y: u32) -> (u32, u32, u32, u32, bool) {
        let x0 = x.saturating_sub(1);
        let y0 = y.saturating_sub(1);
        let x2 = (x + 1).min(self.width - 1);
        let y2 = (y + 1).min(self.height - 1);
        let on_border = x == x0 || x == x2 || y == y0 || y == y2;
        (x0, y0, x2, y2, on_border)
    }

    /// Whether the pixel at `(x, y)` in `img` looks like part of an
    /// anti-aliased edge, checked against the same neighbourhood in
    /// `other`.
    fn anti_aliased(self, img: &[u8], other: &[u8], x: u32, y: u32) -> bool {
        let (x0, y0, x2, y2, on_border) = self.neighbourhood(x, y);
        let pos = self.offset(x, y);
        let mut zeroes = u32::from(on_border);
        let mut min = 0.0_f64;
        let mut max = 0.0_f64;
        let mut min_at = (0, 0);
        let mut max_at = (0, 0);

        for nx in x0..=x2 {
            for ny in y0..=y2 {
                if nx == x && ny == y {
                    continue;
                }
                // Brightness delta between the centre and this neighbour.
                let delta = color_delta(img, img, pos, self.offset(nx, ny), true);
                if delta == 0.0 {
                    zeroes += 1;
                    // More than two identical siblings: not an edge.
                    if zeroes > 2 {
                        return false;
                    }
                } else if delta < min {
                    min = delta;
                    min_at = (nx, ny);
                } else if delta > max {
                    max = delta;
                    max_at = (nx, ny);
                }
            }
        }

        // No both-darker-and-brighter neighbours: not an edge.
        if min == 0.0 || max == 0.0 {
            return false;
        }

        // The darkest or brightest neighbour sits in a flat region in both
        // images, so the centre is a gradient step.
        (self.has_many_siblings(img, min_at.0, min_at.1)
            && self.has_many_siblings(other, min_at.0, min_at.1))
            || (self.has_many_siblings(img, max_at.0, max_at.1)
                && self.has_many_siblings(other, max_at.0, max_at.1))
    }

    /// Whether the pixel at `(x, y)` has three or more identical
    /// neighbours (border pixels count the missing side as one).
    fn has_many_siblings(self, img: &[u8], x: u32, y: u32) -> bool {
        let (x0, y0, x2, y2, on_border) = self.neighbourhood(x, y);
        let pos = self.offset(x, y);
        let mut zeroes = u32::from(on_border);

        for nx in x0..=x2 {
            for ny in y0..=y2 {
                if nx == x && ny == y {
                    continue;
                }
                let other = self.offset(nx, ny);
                if img[pos..pos + BYTES_PER_PIXEL] == img[other..other + BYTES_PER_PIXEL] {
                    zeroes += 1;
                }
                if zeroes > 2 {
                    return true;
                }
            }
        }
        false
    }
}

/// Perceptual colour distance between pixel `k` of `img1` and pixel `m`
/// of `img2`.
///
/// The full delta is negative when the first pixel is brighter. With
/// `y_only` the signed brightness difference (first minus second) is
/// returned instead.
fn color_delta(img1: &[u8], img2: &[u8], k: usize, m: usize, y_only: bool) -> f64 {
    let p1 = &img1[k..k + BYTES_PER_PIXEL];
    let p2 = &img2[m..m + BYTES_PER_PIXEL];
    if p1 == p2 {
        return 0.0;
    }

    let (r1, g1, b1) = blend_onto_white(p1);
    let (r2, g2, b2) = blend_onto_white(p2);

    let y1 = rgb_to_y(r1, g1, b1);
    let y2 = rgb_to_y(r2, g2, b2);
    let y = y1 - y2;
    if y_only {
        return y;
    }

    let i = rgb_to_i(r1, g1, b1) - rgb_to_i(r2, g2, b2);
    let q = rgb_to_q(r1, g1, b1) - rgb_to_q(r2, g2, b2);
    let delta = 0.1957_f64.mul_add(q * q, 0.5053_f64.mul_add(y * y, 0.299 * i * i));

    if y1 > y2 { -delta } else { delta }
}

fn blend_onto_white(pixel: &[u8]) -> (f64, f64, f64) {
    let r = f64::from(pixel[0]);
    let g = f64::from(pixel[1]);
    let b = f64::from(pixel[2]);
    let a = pixel[3];
    if a < 255 {
        let alpha = f64::from(a) / 255.0;
        (blend(r, alpha), blend(g, alpha), blend(b, alpha))
    } else {
        (r, g, b)
    }
}

fn blend(channel: f64, alpha: f64) -> f64 {
    (channel - 255.0).mul_add(alpha, 255.0)
}

fn rgb_to_y(r: f64, g: f64, b: f64) -> f64 {
    b.mul_add(0.114_482_23, r.mul_add(0.298_895_31, g * 0.586_622_47))
}

fn rgb_to_i(r: f64, g: f64, b: f64) -> f64 {
    r.mul_add(0.595_977_99, g.mul_add(-0.274_176_10, b * -0.321_801_89))
}

fn rgb_to_q(r: f64, g: f64, b: f64) -> f64 {
    r.mul_add(0.211_470_17, g.mul_add(-0.522_617_11, b * 0.311_146_94))
}

fn draw_pixel(out: &mut [u8], pos: usize, [r, g, b]: [u8; 3]) {
    out[pos..pos + BYTES_PER_PIXEL].copy_from_slice(&[r, g, b, 255]);
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn draw_gray_pixel(img: &[u8], pos: usize, alpha: f64, out: &mut [u8]) {
    let luma = rgb_to_y(
        f64::from(img[pos]),
        f64::from(img[pos + 1]),
        f64::from(img[pos + 2]),
    );
    let value = blend(luma, alpha * f64::from(img[pos + 3]) / 255.0).clamp(0.0, 255.0) as u8;
    draw_pixel(out, pos, [value, value, value]);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Rgba;

    use super::*;

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        })
    }

    #[test]
    fn identical_images_have_no_difference() {
        let a = checker(8, 5);
        let result = diff_pixels(&a, &a.clone(), &DiffOptions::default());
        assert_eq!(result.diff_pixel_count, 0);
        assert_eq!(result.diff_image.dimensions(), (8, 5));
    }

    #[test]
    fn identical_images_render_faint_grayscale() {
        let a = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let result = diff_pixels(&a, &a, &DiffOptions::default());
        // Black at 10% opacity over white: 255 - 255 * 0.1 = 229.5.
        for pixel in result.diff_image.pixels() {
            assert_eq!(pixel.0, [229, 229, 229, 255]);
        }
    }

    #[test]
    fn single_changed_pixel_is_counted_and_highlighted() {
        let a = RgbaImage::from_pixel(4, 4, Rgba([10, 10, 10, 255]));
        let mut b = a.clone();
        b.put_pixel(2, 1, Rgba([11, 10, 10, 255]));

        let result = diff_pixels(&a, &b, &DiffOptions::default());
        assert_eq!(result.diff_pixel_count, 1);
        assert_eq!(result.diff_image.get_pixel(2, 1).0, [255, 0, 0, 255]);
        assert_ne!(result.diff_image.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn darker_pixels_use_alt_color() {
        let a = RgbaImage::from_pixel(1, 1, Rgba([200, 200, 200, 255]));
        let b = RgbaImage::from_pixel(1, 1, Rgba([10, 10, 10, 255]));
        let options = DiffOptions {
            diff_color_alt: Some([0, 255, 0]),
            ..DiffOptions::default()
        };
        let result = diff_pixels(&a, &b, &options);
        assert_eq!(result.diff_pixel_count, 1);
        assert_eq!(result.diff_image.get_pixel(0, 0).0, [0, 255, 0, 255]);
    }

    #[test]
    fn threshold_ignores_small_changes() {
        let a = RgbaImage::from_pixel(3, 3, Rgba([100, 100, 100, 255]));
        let b = RgbaImage::from_pixel(3, 3, Rgba([101, 100, 100, 255]));
        let loose = DiffOptions {
            threshold: 0.1,
            ..DiffOptions::default()
        };
        assert_eq!(diff_pixels(&a, &b, &loose).diff_pixel_count, 0);
        assert_eq!(diff_pixels(&a, &b, &DiffOptions::default()).diff_pixel_count, 9);
    }

    #[test]
    fn fully_transparent_pixels_compare_equal_regardless_of_colour() {
        let a = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let b = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 255, 0]));
        let result = diff_pixels(&a, &b, &DiffOptions::default());
        assert_eq!(result.diff_pixel_count, 0);
    }

    /// A hard black/white edge in `a`, the same edge with an intermediate
    /// gray column (anti-aliasing) in `b`.
    fn edge_pair() -> (RgbaImage, RgbaImage) {
        let a = RgbaImage::from_fn(9, 9, |x, _| {
            if x < 4 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let b = RgbaImage::from_fn(9, 9, |x, _| match x {
            0..4 => Rgba([0, 0, 0, 255]),
            4 => Rgba([128, 128, 128, 255]),
            _ => Rgba([255, 255, 255, 255]),
        });
        (a, b)
    }

    #[test]
    fn anti_aliased_edge_counted_by_default() {
        let (a, b) = edge_pair();
        let result = diff_pixels(&a, &b, &DiffOptions::default());
        assert_eq!(result.diff_pixel_count, 9);
    }

    #[test]
    fn anti_aliased_edge_excluded_when_detection_enabled() {
        let (a, b) = edge_pair();
        let options = DiffOptions {
            include_anti_aliasing: false,
            ..DiffOptions::default()
        };
        let result = diff_pixels(&a, &b, &options);
        assert_eq!(result.diff_pixel_count, 0);
        assert_eq!(result.diff_image.get_pixel(4, 4).0, [255, 255, 0, 255]);
    }

    #[test]
    fn diff_mask_leaves_matching_pixels_transparent() {
        let a = RgbaImage::from_pixel(2, 1, Rgba([50, 50, 50, 255]));
        let mut b = a.clone();
        b.put_pixel(1, 0, Rgba([255, 255, 255, 255]));
        let options = DiffOptions {
            diff_mask: true,
            ..DiffOptions::default()
        };
        let result = diff_pixels(&a, &b, &options);
        assert_eq!(result.diff_image.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(result.diff_image.get_pixel(1, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn color_delta_sign_tracks_brightness() {
        let white = [255, 255, 255, 255];
        let black = [0, 0, 0, 255];
        assert!(color_delta(&white, &black, 0, 0, false) < 0.0);
        assert!(color_delta(&black, &white, 0, 0, false) > 0.0);
        // Pure brightness change: only the Y term contributes.
        let full = color_delta(&black, &white, 0, 0, false);
        assert!((full - 0.5053 * 255.0 * 255.0).abs() < 1.0, "got {full}");
        assert!(full < MAX_YIQ_DELTA);
    }

    #[test]
    #[should_panic(expected = "pad both images first")]
    fn mismatched_sizes_panic() {
        let a = checker(2, 2);
        let b = checker(2, 3);
        let _ = diff_pixels(&a, &b, &DiffOptions::default());
    }
}
