//! Server configuration.

/// Largest request body accepted by the conversion routes.
pub const DEFAULT_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Largest decoded graphic field `/api/preview` will expand.
pub const DEFAULT_FIELD_LIMIT: u64 = 64 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Maximum upload size in bytes
    pub body_limit: usize,
    /// Maximum decoded size of a previewed graphic field in bytes
    pub field_limit: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
            field_limit: DEFAULT_FIELD_LIMIT,
        }
    }
}
