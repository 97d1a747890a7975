//! Image container decoding.

use std::io::Cursor;

use image::ImageReader;
use tracing::debug;

use super::RasterImage;
use crate::error::ZplError;

/// A decoded image together with the dimensions its header declared.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: RasterImage,
    pub width: u32,
    pub height: u32,
}

/// Decode an image from memory, guessing the container format from its magic bytes.
///
/// The header is read first so a truncated or unknown file fails before any
/// pixel data is touched. Animated formats yield their first frame.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, ZplError> {
    if is_heic(bytes) {
        return decode_heic_image(bytes);
    }

    let (width, height) = reader(bytes)?
        .into_dimensions()
        .map_err(|e| ZplError::UnsupportedOrCorruptImage(format!("Failed to read image header: {}", e)))?;
    debug!(width, height, "Read image header");

    let image = reader(bytes)?
        .decode()
        .map_err(|e| ZplError::UnsupportedOrCorruptImage(format!("Failed to decode image: {}", e)))?;

    Ok(DecodedImage {
        image,
        width,
        height,
    })
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, ZplError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ZplError::UnsupportedOrCorruptImage(e.to_string()))?;

    if reader.format().is_none() {
        return Err(ZplError::UnsupportedOrCorruptImage(
            "Unrecognized image format".to_string(),
        ));
    }
    Ok(reader)
}

/// Check if the data looks like a HEIC/HEIF file by examining magic bytes.
/// HEIC files have an "ftyp" box near the start with HEIC-related brand codes.
fn is_heic(data: &[u8]) -> bool {
    if data.len() < 12 || &data[4..8] != b"ftyp" {
        return false;
    }

    matches!(
        &data[8..12],
        b"heic" | b"heix" | b"hevc" | b"hevx" | b"heim" | b"heis" | b"hevm" | b"hevs" | b"mif1" | b"msf1"
    )
}

#[cfg(feature = "heif")]
fn decode_heic_image(data: &[u8]) -> Result<DecodedImage, ZplError> {
    use image::{DynamicImage, Rgb, RgbImage};
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let corrupt = |msg: String| ZplError::UnsupportedOrCorruptImage(msg);

    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(data).map_err(|e| corrupt(format!("Failed to read HEIC: {}", e)))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| corrupt(format!("Failed to get primary image: {}", e)))?;
    let decoded = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| corrupt(format!("Failed to decode HEIC image: {}", e)))?;

    let width = decoded.width();
    let height = decoded.height();
    let planes = decoded.planes();
    let interleaved = planes
        .interleaved
        .ok_or_else(|| corrupt("No interleaved RGB data in HEIC".to_string()))?;
    let stride = interleaved.stride;
    let pixels = interleaved.data;

    let rgb = RgbImage::from_fn(width, height, |x, y| {
        let offset = y as usize * stride + x as usize * 3;
        match pixels.get(offset..offset + 3) {
            Some(&[r, g, b]) => Rgb([r, g, b]),
            _ => Rgb([255, 255, 255]),
        }
    });

    Ok(DecodedImage {
        image: DynamicImage::ImageRgb8(rgb),
        width,
        height,
    })
}

#[cfg(not(feature = "heif"))]
fn decode_heic_image(_data: &[u8]) -> Result<DecodedImage, ZplError> {
    Err(ZplError::UnsupportedOrCorruptImage(
        "HEIC/HEIF input requires the `heif` feature".to_string(),
    ))
}
