//! # Conversion Pipeline
//!
//! Drives one image through every stage on its way to a graphic field:
//!
//! ```text
//! Idle -> Decoding -> Orienting -> Flattening -> Rescaling -> Encoding -> Emitting -> Done
//!                                                                  \
//!                                          any failure ----------> Aborted
//! ```
//!
//! | Stage | Work | Typical failure |
//! |-------|------|-----------------|
//! | `Decoding` | read the input, decode the container | [`ZplError::UnsupportedOrCorruptImage`], [`ZplError::Io`] |
//! | `Orienting` | rotate by [`ConvertOptions::rotation`] | |
//! | `Flattening` | composite on white, threshold luma | |
//! | `Rescaling` | map source DPI onto target DPI | [`ZplError::EncodingOverflow`] |
//! | `Encoding` | pack rows, compress, build the header | [`ZplError::EncodingOverflow`] |
//! | `Emitting` | write the text to its sink | [`ZplError::Io`] |
//!
//! Every failure aborts the run. The returned error is
//! [`ZplError::Aborted`] carrying the stage and the cause. DPI values are
//! checked when the pipeline is built, before any input is read.
//!
//! ## Example
//!
//! ```
//! use zplgfa::pipeline::{ConvertOptions, Pipeline};
//! use zplgfa::raster::Rotation;
//!
//! let mut png = Vec::new();
//! image::DynamicImage::new_luma8(16, 8)
//!     .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
//!     .unwrap();
//!
//! let options = ConvertOptions {
//!     source_dpi: 100.0,
//!     target_dpi: 200.0,
//!     rotation: Rotation::None,
//!     ..ConvertOptions::default()
//! };
//! let conversion = Pipeline::new(options).unwrap().convert(&png).unwrap();
//!
//! assert_eq!((conversion.width, conversion.height), (32, 16));
//! assert_eq!(conversion.zpl, "^GFA,64,64,4,!:::::::::::::::^FS");
//! ```

use std::fmt;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::ZplError;
use crate::printer::PrinterConfig;
use crate::protocol::commands;
use crate::protocol::graphic_field::{self, EncodedGraphicField, GraphicEncoding, GraphicFieldHeader};
use crate::raster::{self, ResampleFilter, Rotation};
use crate::render::bitmap::MonochromeBitmap;
use crate::render::flatten::flatten;
use crate::render::scale::{self, ScaleFactor};

/// Where a pipeline run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Idle,
    Decoding,
    Orienting,
    Flattening,
    Rescaling,
    Encoding,
    Emitting,
    Done,
    Aborted,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Decoding => "decoding",
            Stage::Orienting => "orienting",
            Stage::Flattening => "flattening",
            Stage::Rescaling => "rescaling",
            Stage::Encoding => "encoding",
            Stage::Emitting => "emitting",
            Stage::Done => "done",
            Stage::Aborted => "aborted",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that shapes one conversion.
///
/// Deserializes from a query string or JSON object; missing keys take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Resolution the input was prepared for
    pub source_dpi: f64,
    /// Resolution of the printer head
    pub target_dpi: f64,
    /// Applied before rescaling
    #[serde(alias = "rotate")]
    pub rotation: Rotation,
    pub filter: ResampleFilter,
    pub encoding: GraphicEncoding,
    /// Wrap the field in `^XA ^FOx,y ... ^XZ`
    pub label: bool,
    pub origin_x: u32,
    pub origin_y: u32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            source_dpi: 200.0,
            target_dpi: 300.0,
            rotation: Rotation::default(),
            filter: ResampleFilter::default(),
            encoding: GraphicEncoding::default(),
            label: false,
            origin_x: 0,
            origin_y: 0,
        }
    }
}

impl ConvertOptions {
    /// Take the target resolution from a printer preset.
    pub fn for_printer(mut self, printer: &PrinterConfig) -> Self {
        self.target_dpi = printer.dpi as f64;
        self
    }

    /// Validated DPI ratio.
    pub fn scale_factor(&self) -> Result<ScaleFactor, ZplError> {
        ScaleFactor::new(self.source_dpi, self.target_dpi)
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Bitmap width in dots
    pub width: usize,
    /// Bitmap height in dots
    pub height: usize,
    pub field: EncodedGraphicField,
    /// The emitted text: the bare field, or a whole label when requested
    pub zpl: String,
}

/// One conversion run.
///
/// A pipeline can be reused; each run starts again from [`Stage::Idle`].
#[derive(Debug)]
pub struct Pipeline {
    options: ConvertOptions,
    scale: ScaleFactor,
    stage: Stage,
}

impl Pipeline {
    /// Fails with [`ZplError::InvalidDpi`] before anything is read.
    pub fn new(options: ConvertOptions) -> Result<Self, ZplError> {
        let scale = options.scale_factor()?;
        Ok(Self {
            options,
            scale,
            stage: Stage::Idle,
        })
    }

    /// Stage reached by the most recent run.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Decode, orient, flatten, rescale and encode an in-memory image.
    ///
    /// This is a partial run: the stage is left at `Encoding` and nothing is
    /// written. [`Pipeline::run`] carries on through `Emitting` to `Done`.
    pub fn convert(&mut self, bytes: &[u8]) -> Result<Conversion, ZplError> {
        self.stage = Stage::Idle;
        self.transform(bytes)
    }

    /// Run every stage, writing the text to `sink`.
    ///
    /// The text is assembled in full before the first byte is written.
    pub fn run<W: Write>(&mut self, bytes: &[u8], sink: &mut W) -> Result<Conversion, ZplError> {
        let conversion = self.convert(bytes)?;
        self.step(Stage::Emitting, || {
            sink.write_all(conversion.zpl.as_bytes())?;
            sink.flush()?;
            Ok(())
        })?;
        self.finish();
        Ok(conversion)
    }

    /// Convert the file at `input` and write the result to `output`.
    ///
    /// The text goes to a temporary file beside `output` that is renamed
    /// into place once complete, so a failed run leaves no file behind.
    pub fn run_file(&mut self, input: &Path, output: &Path) -> Result<Conversion, ZplError> {
        self.stage = Stage::Idle;
        let bytes = self.step(Stage::Decoding, || Ok(std::fs::read(input)?))?;
        let conversion = self.transform(&bytes)?;

        self.step(Stage::Emitting, || write_atomically(output, conversion.zpl.as_bytes()))?;
        self.finish();

        info!(
            input = %input.display(),
            output = %output.display(),
            width = conversion.width,
            height = conversion.height,
            bytes = conversion.field.header().total_bytes,
            "Wrote graphic field"
        );
        Ok(conversion)
    }

    fn transform(&mut self, bytes: &[u8]) -> Result<Conversion, ZplError> {
        let decoded = self.step(Stage::Decoding, || raster::decode(bytes))?;
        debug!(
            width = decoded.width,
            height = decoded.height,
            "Decoded input"
        );

        let rotation = self.options.rotation;
        let oriented = self.step(Stage::Orienting, || Ok(raster::rotate(decoded.image, rotation)))?;

        let bitmap = self.step(Stage::Flattening, || Ok(flatten(oriented)))?;

        let scale = self.scale;
        let filter = self.options.filter;
        let bitmap = self.step(Stage::Rescaling, || rescale(bitmap, scale, filter))?;

        let encoding = self.options.encoding;
        let field = self.step(Stage::Encoding, || graphic_field::encode(&bitmap, encoding))?;

        let zpl = if self.options.label {
            commands::label((self.options.origin_x, self.options.origin_y), &field.to_string())
        } else {
            field.to_string()
        };

        Ok(Conversion {
            width: bitmap.width(),
            height: bitmap.height(),
            field,
            zpl,
        })
    }

    fn step<T>(
        &mut self,
        stage: Stage,
        work: impl FnOnce() -> Result<T, ZplError>,
    ) -> Result<T, ZplError> {
        if self.stage != stage {
            debug!(from = %self.stage, to = %stage, "Pipeline stage");
            self.stage = stage;
        }
        work().map_err(|e| {
            warn!(%stage, error = %e, "Conversion aborted");
            self.stage = Stage::Aborted;
            e.at(stage)
        })
    }

    fn finish(&mut self) {
        debug!(from = %self.stage, to = %Stage::Done, "Pipeline stage");
        self.stage = Stage::Done;
    }
}

/// Scale a flattened bitmap from the source onto the target dot grid.
///
/// The header limit is checked against the target size before any pixels
/// are allocated.
fn rescale(
    bitmap: MonochromeBitmap,
    scale: ScaleFactor,
    filter: ResampleFilter,
) -> Result<MonochromeBitmap, ZplError> {
    let (width, height) = scale.apply_dimensions(bitmap.width() as u32, bitmap.height() as u32);
    GraphicFieldHeader::for_dimensions(width as usize, height as usize)?;

    debug!(
        from_width = bitmap.width(),
        from_height = bitmap.height(),
        width,
        height,
        ratio = scale.ratio(),
        "Rescaling"
    );
    Ok(scale::rescale(bitmap, width, height, filter))
}

fn write_atomically(output: &Path, text: &[u8]) -> Result<(), ZplError> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(text)?;
    file.as_file().sync_all()?;
    file.persist(output).map_err(|e| ZplError::Io(e.error))?;
    Ok(())
}

/// Convert an in-memory image with `options`.
pub fn convert_bytes(bytes: &[u8], options: &ConvertOptions) -> Result<Conversion, ZplError> {
    Pipeline::new(options.clone())?.convert(bytes)
}

/// Convert `input` into `output` with `options`.
pub fn convert_file(input: &Path, output: &Path, options: &ConvertOptions) -> Result<Conversion, ZplError> {
    Pipeline::new(options.clone())?.run_file(input, output)
}
