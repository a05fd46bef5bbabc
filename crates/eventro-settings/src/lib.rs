//! # eventro-settings
//!
//! Layered configuration for the Eventro server:
//!
//! 1. Compiled defaults ([`EventroSettings::default`])
//! 2. `~/.eventro/settings.json`, deep-merged over defaults
//! 3. `EVENTRO_*` environment variable overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{load_settings, load_settings_from_path, settings_path};
pub use types::{
    CorsSettings, DatabaseSettings, EventroSettings, LogLevel, LoggingSettings, ServerSettings,
};
