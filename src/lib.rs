//! # zplgfa - Images to ZPL Graphic Fields
//!
//! zplgfa turns raster images into `^GFA` graphic fields for ZPL label
//! printers. It provides:
//!
//! - **Decoding**: PNG, JPEG, GIF, BMP, TIFF, WebP (and HEIF with the `heif` feature)
//! - **Rescaling**: maps the source resolution onto the printer's dot grid
//! - **Flattening**: alpha over white, fixed-weight luma, midpoint threshold
//! - **Encoding**: plain hex, ZPL run-length compressed hex, or Z64
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use zplgfa::{ConvertOptions, PrinterConfig, pipeline};
//!
//! let options = ConvertOptions {
//!     source_dpi: 150.0,
//!     label: true,
//!     ..ConvertOptions::default()
//! }
//! .for_printer(&PrinterConfig::ZEBRA_203);
//!
//! let conversion = pipeline::convert_file(
//!     Path::new("logo.png"),
//!     Path::new("logo.zpl"),
//!     &options,
//! )?;
//! println!("{}x{} dots", conversion.width, conversion.height);
//!
//! # Ok::<(), zplgfa::ZplError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`pipeline`] | Decode, orient, flatten, rescale, encode, emit |
//! | [`batch`] | Many conversions in parallel |
//! | [`raster`] | Image decoding, rotation and resizing |
//! | [`render`] | Monochrome bitmaps, flattening and DPI scaling |
//! | [`protocol`] | ZPL commands and graphic field codecs |
//! | [`printer`] | Printer presets |
//! | [`server`] | HTTP conversion service |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Any printer that understands ZPL II `^GF` with ASCII data. Presets are
//! provided for 203, 300 and 600 DPI heads.

pub mod batch;
pub mod error;
pub mod pipeline;
pub mod printer;
pub mod protocol;
pub mod raster;
pub mod render;
pub mod server;

// Re-exports for convenience
pub use error::ZplError;
pub use pipeline::{Conversion, ConvertOptions, Pipeline, Stage};
pub use printer::PrinterConfig;
pub use protocol::graphic_field::GraphicEncoding;
