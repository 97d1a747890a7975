//! Conversion API handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderName, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::ZplError,
    pipeline::{ConvertOptions, Pipeline},
    printer::PrinterConfig,
    protocol::graphic_field,
    server::ServerConfig,
};

use super::error_response;

/// Response header carrying the bitmap width in dots.
pub const BITMAP_WIDTH: &str = "x-bitmap-width";
/// Response header carrying the bitmap height in dots.
pub const BITMAP_HEIGHT: &str = "x-bitmap-height";

/// Printer preset selected alongside the conversion options.
#[derive(Debug, Default, Deserialize)]
pub struct PrinterQuery {
    /// Preset key such as `zebra-203`; overrides `target_dpi`
    pub printer: Option<String>,
}

/// POST /api/convert - Convert the image in the request body.
///
/// Options come from the query string, e.g.
/// `/api/convert?source_dpi=100&printer=zebra-300&rotate=0&label=true`.
/// Responds with the ZPL text.
pub async fn convert(
    Query(options): Query<ConvertOptions>,
    Query(target): Query<PrinterQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (options, printer) = match target.printer {
        Some(name) => {
            let printer = PrinterConfig::by_name(&name)
                .ok_or(ZplError::UnknownPrinter(name))
                .map_err(error_response)?;
            (options.for_printer(&printer), Some(printer))
        }
        None => (options, None),
    };
    debug!(bytes = body.len(), ?options, "Convert request");

    // Move CPU-intensive work to blocking thread pool
    let (conversion, zpl) = tokio::task::spawn_blocking(move || {
        let mut pipeline = Pipeline::new(options)?;
        let mut zpl = Vec::new();
        let conversion = pipeline.run(&body, &mut zpl)?;
        debug!(stage = %pipeline.stage(), "Convert finished");
        Ok::<_, ZplError>((conversion, zpl))
    })
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Processing error: {}", e),
        )
    })?
    .map_err(error_response)?;

    if let Some(printer) = printer {
        if conversion.width > printer.width_dots as usize {
            warn!(
                width = conversion.width,
                printer = printer.key,
                max = printer.width_dots,
                "Graphic is wider than the print head"
            );
        }
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (HeaderName::from_static(BITMAP_WIDTH), conversion.width.to_string()),
            (HeaderName::from_static(BITMAP_HEIGHT), conversion.height.to_string()),
        ],
        zpl,
    ))
}

/// POST /api/preview - Render the first graphic field in a ZPL body as PNG.
///
/// Fields declaring more than `field_limit` bytes are refused before decoding.
pub async fn preview(
    State(config): State<Arc<ServerConfig>>,
    body: String,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let limit = config.field_limit;
    let png_bytes = tokio::task::spawn_blocking(move || {
        graphic_field::parse_with_limit(&body, limit)?.to_bitmap()?.to_png()
    })
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Processing error: {}", e),
        )
    })?
    .map_err(error_response)?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png_bytes))
}
