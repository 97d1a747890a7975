//! # Monochrome Flattening
//!
//! Reduces a decoded raster of any depth to a [`MonochromeBitmap`] with one
//! fixed per-pixel rule:
//!
//! 1. Composite the pixel over a white background using its alpha
//! 2. Compute luma with BT.601 weights in 16.16 fixed point:
//!    `Y = (19595 R + 38470 G + 7471 B + 32768) >> 16`
//! 3. Black if `Y < 128`, white otherwise
//!
//! There is no per-image adaptation and no dithering, so the result depends on
//! each pixel alone. Transparent areas always come out white.
//!
//! ```
//! use image::{DynamicImage, Rgba, RgbaImage};
//! use zplgfa::render::flatten::flatten;
//!
//! let mut img = RgbaImage::from_pixel(2, 1, Rgba([255, 255, 255, 255]));
//! img.put_pixel(0, 0, Rgba([10, 10, 10, 255]));
//!
//! let bitmap = flatten(DynamicImage::ImageRgba8(img));
//! assert!(bitmap.get(0, 0));
//! assert!(!bitmap.get(1, 0));
//! ```

use image::{DynamicImage, Rgba};
use tracing::debug;

use super::bitmap::MonochromeBitmap;

/// Luma values below this are printed black.
pub const LUMA_THRESHOLD: u8 = 128;

/// Perceptual luma of an opaque RGB pixel.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 19595 * r as u32 + 38470 * g as u32 + 7471 * b as u32 + 32768;
    (y >> 16) as u8
}

/// Blend one channel over white with the given alpha.
#[inline]
pub fn over_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (channel as u32, alpha as u32);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

/// The flattening rule for a single pixel.
#[inline]
pub fn is_black(pixel: Rgba<u8>) -> bool {
    let [r, g, b, a] = pixel.0;
    luma(over_white(r, a), over_white(g, a), over_white(b, a)) < LUMA_THRESHOLD
}

/// Reduce a raster image to a 1-bit bitmap of the same dimensions.
pub fn flatten(image: DynamicImage) -> MonochromeBitmap {
    let rgba = image.into_rgba8();
    let (width, height) = rgba.dimensions();
    debug!(width, height, "Flattening image to monochrome");

    MonochromeBitmap::from_fn(width as usize, height as usize, |x, y| {
        is_black(*rgba.get_pixel(x as u32, y as u32))
    })
}

// ============================================================================
// TESTS
// ============================================================================
