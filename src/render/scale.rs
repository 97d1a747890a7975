//! # DPI Rescaling
//!
//! Maps an image captured at one resolution onto the dot grid of a printer
//! with another resolution.
//!
//! ```text
//! scale      = target_dpi / source_dpi
//! new_width  = floor(width  * target_dpi / source_dpi)
//! new_height = floor(height * target_dpi / source_dpi)
//! ```
//!
//! Dimensions are truncated, never rounded, so a tiny scale factor can
//! legitimately produce a zero-sized result.
//!
//! The width and height passed in are those of the image *after* rotation.
//! Both axes are multiplied by the same factor.
//!
//! ```
//! use zplgfa::render::scale::compute_target_dimensions;
//!
//! // 100 dpi artwork on a 300 dpi head triples in size
//! assert_eq!(compute_target_dimensions(100, 50, 100.0, 300.0).unwrap(), (300, 150));
//!
//! // 203 dpi down to 200: 1000 * 200 / 203 = 985.2...
//! assert_eq!(compute_target_dimensions(1000, 1000, 203.0, 200.0).unwrap(), (985, 985));
//! ```

use tracing::debug;

use super::bitmap::MonochromeBitmap;
use super::flatten::flatten;
use crate::error::ZplError;
use crate::raster::{ResampleFilter, resize};

/// Validated ratio between a source and a target resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor {
    source_dpi: f64,
    target_dpi: f64,
}

impl ScaleFactor {
    /// Both resolutions must be finite and greater than zero.
    pub fn new(source_dpi: f64, target_dpi: f64) -> Result<Self, ZplError> {
        validate_dpi("source", source_dpi)?;
        validate_dpi("target", target_dpi)?;
        Ok(Self {
            source_dpi,
            target_dpi,
        })
    }

    /// `target_dpi / source_dpi`
    pub fn ratio(&self) -> f64 {
        self.target_dpi / self.source_dpi
    }

    /// Scale one dimension, truncating toward zero.
    ///
    /// Results beyond `u32::MAX` saturate.
    #[inline]
    pub fn apply(&self, pixels: u32) -> u32 {
        (pixels as f64 * self.target_dpi / self.source_dpi).floor() as u32
    }

    /// Scale a width/height pair.
    pub fn apply_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        (self.apply(width), self.apply(height))
    }
}

fn validate_dpi(which: &str, dpi: f64) -> Result<(), ZplError> {
    if !dpi.is_finite() || dpi <= 0.0 {
        return Err(ZplError::InvalidDpi(format!(
            "{} DPI must be a finite number greater than zero, got {}",
            which, dpi
        )));
    }
    Ok(())
}

/// Parse a DPI value from user input.
///
/// ```
/// use zplgfa::render::scale::parse_dpi;
///
/// assert_eq!(parse_dpi("203").unwrap(), 203.0);
/// assert!(parse_dpi("abc").is_err());
/// assert!(parse_dpi("-5").is_err());
/// ```
pub fn parse_dpi(s: &str) -> Result<f64, ZplError> {
    let dpi: f64 = s
        .trim()
        .parse()
        .map_err(|_| ZplError::InvalidDpi(format!("'{}' is not a number", s)))?;
    validate_dpi("", dpi).map_err(|_| {
        ZplError::InvalidDpi(format!("'{}' must be a finite number greater than zero", s))
    })?;
    Ok(dpi)
}

/// Compute the dot dimensions of a `width` x `height` image printed at `target_dpi`.
pub fn compute_target_dimensions(
    width: u32,
    height: u32,
    source_dpi: f64,
    target_dpi: f64,
) -> Result<(u32, u32), ZplError> {
    Ok(ScaleFactor::new(source_dpi, target_dpi)?.apply_dimensions(width, height))
}

/// Resample a bitmap to `width` x `height`.
///
/// The bitmap is rendered to grayscale, resized with `filter` and flattened
/// again with the same midpoint threshold, so the output stays strictly
/// black and white.
pub fn rescale(
    bitmap: MonochromeBitmap,
    width: u32,
    height: u32,
    filter: ResampleFilter,
) -> MonochromeBitmap {
    let (width_px, height_px) = (width as usize, height as usize);

    if (bitmap.width(), bitmap.height()) == (width_px, height_px) {
        return bitmap;
    }
    if width == 0 || height == 0 || bitmap.is_empty() {
        debug!(width, height, "Rescale target has no area");
        return MonochromeBitmap::new(width_px, height_px);
    }

    debug!(
        from_w = bitmap.width(),
        from_h = bitmap.height(),
        width,
        height,
        "Rescaling bitmap"
    );
    flatten(resize(&bitmap.to_image(), width, height, filter))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upscale() {
        assert_eq!(compute_target_dimensions(100, 100, 100.0, 300.0).unwrap(), (300, 300));
        assert_eq!(compute_target_dimensions(640, 480, 200.0, 300.0).unwrap(), (960, 720));
    }

    #[test]
    fn test_truncates() {
        // 7 * 1.5 = 10.5
        assert_eq!(compute_target_dimensions(7, 3, 200.0, 300.0).unwrap(), (10, 4));
        // 99 * 203 / 300 = 66.99
        assert_eq!(compute_target_dimensions(99, 99, 300.0, 203.0).unwrap(), (66, 66));
    }

    #[test]
    fn test_tiny_scale_yields_zero() {
        assert_eq!(compute_target_dimensions(3, 50, 1000.0, 1.0).unwrap(), (0, 0));
    }

    #[test]
    fn test_matches_floor_formula() {
        let dpis = [72.0, 96.0, 150.0, 200.0, 203.0, 300.0, 600.0, 0.5, 1234.5];
        for &s in &dpis {
            for &t in &dpis {
                for w in [0u32, 1, 7, 100, 333, 1024] {
                    let (nw, _) = compute_target_dimensions(w, 1, s, t).unwrap();
                    assert_eq!(nw, (w as f64 * t / s).floor() as u32, "w={} s={} t={}", w, s, t);
                }
            }
        }
    }

    #[test]
    fn test_monotonic_in_target_dpi() {
        for w in [1u32, 13, 100, 799] {
            let mut previous = 0;
            for t in (1..=1200).step_by(7) {
                let (nw, nh) = compute_target_dimensions(w, w, 203.0, t as f64).unwrap();
                assert_eq!(nw, nh);
                assert!(nw >= previous, "w={} t={}: {} < {}", w, t, nw, previous);
                previous = nw;
            }
        }
    }

    #[test]
    fn test_invalid_dpi() {
        for (s, t) in [
            (0.0, 300.0),
            (200.0, -5.0),
            (-1.0, 300.0),
            (200.0, 0.0),
            (f64::NAN, 300.0),
            (200.0, f64::INFINITY),
        ] {
            let err = compute_target_dimensions(10, 10, s, t).unwrap_err();
            assert!(matches!(err, ZplError::InvalidDpi(_)), "s={} t={}", s, t);
        }
    }

    #[test]
    fn test_parse_dpi() {
        assert_eq!(parse_dpi(" 300 ").unwrap(), 300.0);
        assert_eq!(parse_dpi("203.2").unwrap(), 203.2);
        for bad in ["", "abc", "0", "-5", "NaN", "inf", "12dpi"] {
            assert!(
                matches!(parse_dpi(bad), Err(ZplError::InvalidDpi(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_scale_factor_ratio() {
        let factor = ScaleFactor::new(200.0, 300.0).unwrap();
        assert_eq!(factor.ratio(), 1.5);
        assert_eq!(factor.apply_dimensions(10, 20), (15, 30));
    }

    #[test]
    fn test_rescale_identity() {
        let bitmap = MonochromeBitmap::from_fn(10, 10, |x, y| (x ^ y) & 1 == 1);
        let same = rescale(bitmap.clone(), 10, 10, ResampleFilter::Lanczos3);
        assert_eq!(same, bitmap);
    }

    #[test]
    fn test_rescale_to_zero() {
        let bitmap = MonochromeBitmap::from_fn(10, 10, |_, _| true);
        let empty = rescale(bitmap, 0, 5, ResampleFilter::Lanczos3);
        assert_eq!((empty.width(), empty.height()), (0, 5));
        assert_eq!(empty.total_bytes(), 0);
    }

    #[test]
    fn test_rescale_solid_stays_solid() {
        let black = MonochromeBitmap::from_fn(10, 10, |_, _| true);
        let scaled = rescale(black, 30, 30, ResampleFilter::Lanczos3);
        assert_eq!((scaled.width(), scaled.height()), (30, 30));
        assert!(scaled.rows().all(|row| row == [0xFF, 0xFF, 0xFF, 0xFC]));
    }

    #[test]
    fn test_rescale_nearest_upscale() {
        // Left half black
        let bitmap = MonochromeBitmap::from_fn(4, 2, |x, _| x < 2);
        let scaled = rescale(bitmap, 8, 4, ResampleFilter::Nearest);
        assert!(scaled.rows().all(|row| row == [0xF0]));
    }
}
