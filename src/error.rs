//! # Error Types
//!
//! This module defines error types used throughout the zplgfa library.
//!
//! Every failure is unrecoverable for a single conversion. The pipeline wraps
//! the underlying cause in [`ZplError::Aborted`] together with the stage that
//! failed, so callers can report both without string matching.

use thiserror::Error;

use crate::pipeline::Stage;

/// Main error type for zplgfa operations
#[derive(Debug, Error)]
pub enum ZplError {
    /// Source or target DPI is non-positive, not finite, or not a number
    #[error("Invalid DPI: {0}")]
    InvalidDpi(String),

    /// The input bytes could not be decoded as a raster image
    #[error("Unsupported or corrupt image: {0}")]
    UnsupportedOrCorruptImage(String),

    /// The packed bitmap is too large for the graphic field header
    #[error("Encoding overflow: {bytes_per_row} bytes per row x {rows} rows exceeds {limit} bytes")]
    EncodingOverflow {
        bytes_per_row: usize,
        rows: usize,
        limit: u64,
    },

    /// A graphic field could not be parsed back into a bitmap
    #[error("Malformed graphic field: {0}")]
    MalformedField(String),

    /// Image encoding error (PNG previews)
    #[error("Image error: {0}")]
    Image(String),

    /// No built-in printer preset has this name
    #[error("Unknown printer '{0}'")]
    UnknownPrinter(String),

    /// Some files of a batch could not be converted
    #[error("{failed} of {total} conversions failed")]
    BatchFailed { failed: usize, total: usize },

    /// HTTP service errors (bind, serve)
    #[error("Server error: {0}")]
    Server(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A pipeline run stopped at `stage`
    #[error("{stage} failed: {source}")]
    Aborted {
        stage: Stage,
        #[source]
        source: Box<ZplError>,
    },
}

impl ZplError {
    /// Wrap this error with the pipeline stage it occurred in.
    pub fn at(self, stage: Stage) -> Self {
        match self {
            // Keep the innermost stage
            aborted @ ZplError::Aborted { .. } => aborted,
            other => ZplError::Aborted {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The stage a pipeline run aborted in, if this error came from one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ZplError::Aborted { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The underlying cause with any stage wrapping removed.
    pub fn root_cause(&self) -> &ZplError {
        match self {
            ZplError::Aborted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
