//! # Raster Collaborators
//!
//! Thin adapters over the `image` crate for the work the conversion core
//! delegates: container decoding and 90°-class geometry.
//!
//! ## Modules
//!
//! - [`decode`]: PNG, JPEG, GIF, BMP, TIFF, WebP (and HEIF with the `heif` feature)
//! - [`transform`]: rotation and resampling

pub mod decode;
pub mod transform;

/// A decoded image of any color type and depth.
pub type RasterImage = image::DynamicImage;

pub use decode::{DecodedImage, decode};
pub use transform::{ResampleFilter, Rotation, resize, rotate};
