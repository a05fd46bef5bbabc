//! # eventro-server
//!
//! Axum HTTP server and REST API for Eventro.
//!
//! - CRUD endpoints for events, tickets, conversations, and messages
//! - CORS for the web client, configured from settings
//! - `/health` and Prometheus `/metrics` endpoints
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{AppState, EventroServer};
pub use shutdown::{ShutdownCoordinator, DEFAULT_SHUTDOWN_TIMEOUT};
