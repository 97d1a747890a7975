//! # Monochrome Bitmaps
//!
//! A [`MonochromeBitmap`] is the 1-bit image every graphic field is built from.
//!
//! ## Bit Packing
//!
//! Rows are packed left to right, most significant bit first:
//! - Bit 7 (MSB) = leftmost pixel
//! - Bit 0 (LSB) = rightmost pixel
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! Byte value 0xAA = 10101010 = █░█░█░█░
//! ```
//!
//! A row of `width` pixels occupies `ceil(width / 8)` bytes. Bits past the
//! right edge are always 0, so a padded byte prints white.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use rayon::prelude::*;

use crate::error::ZplError;

/// A 1-bit-per-pixel image with packed rows.
///
/// Values are immutable once built; every pipeline stage returns a new bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonochromeBitmap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl MonochromeBitmap {
    /// An all-white bitmap.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width.div_ceil(8) * height],
        }
    }

    /// Build a bitmap from a pixel predicate (`true` = black).
    ///
    /// Rows are evaluated in parallel, so `is_black` must be a pure function
    /// of its coordinates.
    ///
    /// ```
    /// use zplgfa::render::bitmap::MonochromeBitmap;
    ///
    /// let checker = MonochromeBitmap::from_fn(16, 2, |x, y| (x + y) % 2 == 0);
    /// assert_eq!(checker.row(0), &[0xAA, 0xAA]);
    /// assert_eq!(checker.row(1), &[0x55, 0x55]);
    /// ```
    pub fn from_fn<F>(width: usize, height: usize, is_black: F) -> Self
    where
        F: Fn(usize, usize) -> bool + Sync,
    {
        let bytes_per_row = width.div_ceil(8);
        let mut data = vec![0u8; bytes_per_row * height];

        if bytes_per_row > 0 {
            data.par_chunks_mut(bytes_per_row)
                .enumerate()
                .for_each(|(y, row)| {
                    for x in 0..width {
                        if is_black(x, y) {
                            row[x / 8] |= 0x80 >> (x % 8);
                        }
                    }
                });
        }

        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap already packed row data.
    ///
    /// Fails if `data` is not exactly `ceil(width / 8) * height` bytes.
    /// Padding bits past the right edge are cleared.
    pub fn from_packed(width: usize, height: usize, mut data: Vec<u8>) -> Result<Self, ZplError> {
        let bytes_per_row = width.div_ceil(8);
        let expected = bytes_per_row
            .checked_mul(height)
            .ok_or_else(|| ZplError::MalformedField(format!("{}x{} bitmap is too large", width, height)))?;

        if data.len() != expected {
            return Err(ZplError::MalformedField(format!(
                "Bitmap data length mismatch. Expected {} ({} bytes × {} rows), got {}",
                expected,
                bytes_per_row,
                height,
                data.len()
            )));
        }

        let used_bits = width % 8;
        if used_bits != 0 {
            let mask = 0xFFu8 << (8 - used_bits);
            for row in data.chunks_exact_mut(bytes_per_row) {
                row[bytes_per_row - 1] &= mask;
            }
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per packed row, `ceil(width / 8)`
    #[inline]
    pub fn bytes_per_row(&self) -> usize {
        self.width.div_ceil(8)
    }

    /// Total packed size in bytes
    #[inline]
    pub fn total_bytes(&self) -> usize {
        self.data.len()
    }

    /// True when the bitmap has no pixels
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Packed bytes of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &[u8] {
        let bytes_per_row = self.bytes_per_row();
        &self.data[y * bytes_per_row..(y + 1) * bytes_per_row]
    }

    /// Iterate over packed rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }

    /// Whether the pixel at (x, y) is black.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        let byte = self.data[y * self.bytes_per_row() + x / 8];
        byte & (0x80 >> (x % 8)) != 0
    }

    /// All packed rows back to back.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Render to 8-bit grayscale: black pixels are 0, white pixels 255.
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            if self.get(x as usize, y as usize) {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        })
    }

    /// Render as a raster image so it can go back through the pipeline.
    pub fn to_image(&self) -> DynamicImage {
        DynamicImage::ImageLuma8(self.to_luma())
    }

    /// Encode as a PNG (black on white).
    pub fn to_png(&self) -> Result<Vec<u8>, ZplError> {
        let mut buf = Cursor::new(Vec::new());
        self.to_luma()
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| ZplError::Image(format!("Failed to encode PNG: {}", e)))?;
        Ok(buf.into_inner())
    }
}

// ============================================================================
// TESTS
// ============================================================================
