//! HTTP handlers for the server.

pub mod convert;
pub mod printers;

use axum::http::StatusCode;

use crate::error::ZplError;

/// Map a conversion failure onto a status code and a one-line message.
pub(crate) fn error_response(err: ZplError) -> (StatusCode, String) {
    let status = match err.root_cause() {
        ZplError::InvalidDpi(_)
        | ZplError::UnsupportedOrCorruptImage(_)
        | ZplError::MalformedField(_)
        | ZplError::UnknownPrinter(_) => StatusCode::BAD_REQUEST,
        ZplError::EncodingOverflow { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

/// GET /health - Liveness check.
pub async fn health() -> &'static str {
    "ok"
}
