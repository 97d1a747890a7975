//! Printer preset handlers.

use axum::Json;

use crate::printer::PrinterConfig;

/// GET /api/printers - List built-in printer presets.
pub async fn list() -> Json<Vec<PrinterConfig>> {
    Json(PrinterConfig::BUILT_IN.to_vec())
}
