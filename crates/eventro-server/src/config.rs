//! Server configuration.

use eventro_settings::types::EventroSettings;
use serde::{Deserialize, Serialize};

/// Configuration for the Eventro HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
    /// Origins allowed to call the API. `["*"]` allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            max_body_bytes: 1024 * 1024, // 1 MB
            allowed_origins: vec!["http://localhost:5173".into()],
        }
    }
}

impl ServerConfig {
    /// Build a server config from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &EventroSettings) -> Self {
        Self {
            host: settings.server.host.clone(),
            port: settings.server.port,
            max_body_bytes: settings.server.max_body_bytes,
            allowed_origins: settings.cors.allowed_origins.clone(),
        }
    }
}
