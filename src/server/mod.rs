//! # HTTP Conversion Service
//!
//! Exposes the conversion pipeline over HTTP.
//!
//! | Route | Body | Response |
//! |-------|------|----------|
//! | `POST /api/convert` | image bytes | ZPL text |
//! | `POST /api/preview` | ZPL text | PNG of the first graphic field |
//! | `GET /api/printers` | | JSON list of printer presets |
//! | `GET /health` | | `ok` |
//!
//! Conversion options are read from the query string using the
//! [`ConvertOptions`](crate::pipeline::ConvertOptions) field names, plus
//! `printer` to pick a preset.
//!
//! ## Usage
//!
//! ```bash
//! zplgfa serve --listen 0.0.0.0:8080
//! curl --data-binary @logo.png 'http://localhost:8080/api/convert?source_dpi=100&label=true'
//! ```

mod config;
mod handlers;

pub use handlers::convert::{BITMAP_HEIGHT, BITMAP_WIDTH};
pub use config::{ServerConfig, DEFAULT_BODY_LIMIT, DEFAULT_FIELD_LIMIT};

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ZplError;

/// Build the application router.
pub fn router(config: &ServerConfig) -> Router {
    let state = Arc::new(config.clone());

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/printers", get(handlers::printers::list))
        .route("/api/convert", post(handlers::convert::convert))
        .route("/api/preview", post(handlers::convert::preview))
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use zplgfa::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), zplgfa::error::ZplError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     ..ServerConfig::default()
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), ZplError> {
    let listen_addr = &config.listen_addr;
    let app = router(&config);

    let listener = tokio::net::TcpListener::bind(listen_addr.as_str())
        .await
        .map_err(|e| ZplError::Server(format!("Failed to bind to {}: {}", listen_addr, e)))?;

    info!(addr = %listen_addr, "zplgfa HTTP server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| ZplError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
