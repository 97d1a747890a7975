//! Rotation and resampling.

use std::fmt;
use std::str::FromStr;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::RasterImage;

/// Clockwise rotation applied before flattening.
///
/// The default turns the image a quarter turn clockwise, which puts a
/// landscape picture along the feed direction of a label printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rotation {
    None,
    #[default]
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Parse a clockwise angle in degrees. Negative angles rotate counter-clockwise.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::None),
            90 => Some(Self::Cw90),
            180 => Some(Self::Cw180),
            270 => Some(Self::Cw270),
            _ => None,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Cw90 => 90,
            Self::Cw180 => 180,
            Self::Cw270 => 270,
        }
    }
}

impl TryFrom<i32> for Rotation {
    type Error = String;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees)
            .ok_or_else(|| format!("rotation must be a multiple of 90 degrees, got {}", degrees))
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl FromStr for Rotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            other => {
                let degrees: i32 = other
                    .parse()
                    .map_err(|_| format!("invalid rotation '{}': expected 0, 90, 180 or 270", s))?;
                Self::try_from(degrees)
            }
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

/// Resampling filter used when rescaling to the target DPI.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Rotate clockwise by the given amount.
pub fn rotate(image: RasterImage, rotation: Rotation) -> RasterImage {
    debug!(degrees = rotation.degrees(), "Rotating image");
    match rotation {
        Rotation::None => image,
        Rotation::Cw90 => image.rotate90(),
        Rotation::Cw180 => image.rotate180(),
        Rotation::Cw270 => image.rotate270(),
    }
}

/// Resample to exactly `width` x `height`, ignoring aspect ratio.
pub fn resize(image: &RasterImage, width: u32, height: u32, filter: ResampleFilter) -> RasterImage {
    debug!(
        from_w = image.width(),
        from_h = image.height(),
        width,
        height,
        ?filter,
        "Resizing image"
    );
    image.resize_exact(width, height, filter.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, GrayImage, Luma};

    /// Top-left=10, Top-right=20, Bottom-left=30, Bottom-right=40
    fn corner_image(width: u32, height: u32) -> DynamicImage {
        let mut img = GrayImage::from_pixel(width, height, Luma([128]));
        img.put_pixel(0, 0, Luma([10]));
        img.put_pixel(width - 1, 0, Luma([20]));
        img.put_pixel(0, height - 1, Luma([30]));
        img.put_pixel(width - 1, height - 1, Luma([40]));
        DynamicImage::ImageLuma8(img)
    }

    fn pixel_value(img: &DynamicImage, x: u32, y: u32) -> u8 {
        img.to_luma8().get_pixel(x, y).0[0]
    }

    #[test]
    fn test_rotate_90_clockwise() {
        let rotated = rotate(corner_image(6, 4), Rotation::Cw90);
        assert_eq!(rotated.dimensions(), (4, 6));
        // Bottom-left moves to top-left, top-left to top-right
        assert_eq!(pixel_value(&rotated, 0, 0), 30);
        assert_eq!(pixel_value(&rotated, 3, 0), 10);
        assert_eq!(pixel_value(&rotated, 3, 5), 20);
        assert_eq!(pixel_value(&rotated, 0, 5), 40);
    }

    #[test]
    fn test_rotate_none_and_180() {
        let img = corner_image(5, 3);
        assert_eq!(rotate(img.clone(), Rotation::None).dimensions(), (5, 3));

        let rotated = rotate(img, Rotation::Cw180);
        assert_eq!(rotated.dimensions(), (5, 3));
        assert_eq!(pixel_value(&rotated, 0, 0), 40);
    }

    #[test]
    fn test_rotate_270() {
        let rotated = rotate(corner_image(6, 4), Rotation::Cw270);
        assert_eq!(rotated.dimensions(), (4, 6));
        assert_eq!(pixel_value(&rotated, 0, 0), 20);
    }

    #[test]
    fn test_rotation_parsing() {
        assert_eq!("90".parse::<Rotation>(), Ok(Rotation::Cw90));
        assert_eq!("0".parse::<Rotation>(), Ok(Rotation::None));
        assert_eq!("none".parse::<Rotation>(), Ok(Rotation::None));
        assert_eq!("-90".parse::<Rotation>(), Ok(Rotation::Cw270));
        assert!("45".parse::<Rotation>().is_err());
        assert!("left".parse::<Rotation>().is_err());
    }

    #[test]
    fn test_resize_exact() {
        let resized = resize(&corner_image(10, 10), 30, 7, ResampleFilter::Lanczos3);
        assert_eq!(resized.dimensions(), (30, 7));
    }
}
