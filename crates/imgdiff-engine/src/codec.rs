//! Image decoding and PNG encoding.
//!
//! The decode side accepts raw image bytes (PNG, JPEG, BMP, WebP) and
//! produces an RGBA8 image, the only pixel layout the rest of the engine
//! works with. The encode side writes RGBA8 images back out as PNG.

use image::ImageEncoder;

use crate::types::{DiffError, RgbaImage};

/// Decode raw image bytes into RGBA8.
///
/// # Errors
///
/// Returns [`DiffError::EmptyInput`] if `bytes` is empty.
/// Returns [`DiffError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, DiffError> {
    if bytes.is_empty() {
        return Err(DiffError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgba8())
}

/// Encode an RGBA8 image as PNG.
///
/// # Errors
///
/// Returns [`DiffError::ImageEncode`] if the PNG encoder rejects the image.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, DiffError> {
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| DiffError::ImageEncode(e.to_string()))?;
    Ok(buf)
}
