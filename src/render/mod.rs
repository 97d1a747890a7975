//! # Rendering Module
//!
//! Turns decoded raster images into the 1-bit bitmaps a graphic field carries.
//!
//! ## Modules
//!
//! - [`bitmap`]: Packed monochrome bitmaps
//! - [`flatten`]: Fixed-threshold reduction to black and white
//! - [`scale`]: DPI-aware rescaling
//!
//! ## Usage Example
//!
//! ```
//! use image::{DynamicImage, GrayImage, Luma};
//! use zplgfa::raster::ResampleFilter;
//! use zplgfa::render::{flatten::flatten, scale};
//!
//! let img = GrayImage::from_fn(100, 40, |x, _| Luma([if x < 50 { 0 } else { 255 }]));
//! let bitmap = flatten(DynamicImage::ImageLuma8(img));
//!
//! let (w, h) = scale::compute_target_dimensions(100, 40, 200.0, 300.0).unwrap();
//! let bitmap = scale::rescale(bitmap, w, h, ResampleFilter::Lanczos3);
//! assert_eq!((bitmap.width(), bitmap.height()), (150, 60));
//! ```

pub mod bitmap;
pub mod flatten;
pub mod scale;
