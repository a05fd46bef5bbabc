//! # eventro
//!
//! Eventro server binary — wires the settings, store, and HTTP server
//! crates together and runs until interrupted.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use eventro_core::logging::init_subscriber;
use eventro_server::config::ServerConfig;
use eventro_server::server::EventroServer;
use eventro_server::DEFAULT_SHUTDOWN_TIMEOUT;
use eventro_settings::types::EventroSettings;
use eventro_store::{new_file, run_migrations, ConnectionConfig, Store};

/// Eventro ticketing server.
#[derive(Parser, Debug)]
#[command(name = "eventro", about = "Eventro ticketing server")]
struct Cli {
    /// Host to bind (overrides settings if specified).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings if specified, 0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database (overrides settings if specified).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Path to the settings file (defaults to `~/.eventro/settings.json`).
    #[arg(long)]
    settings_path: Option<PathBuf>,
}

/// Resolve the database path from CLI and settings.
///
/// A relative settings path resolves against `~/.eventro`, so the default
/// `eventro.db` lands next to the settings file rather than in the CWD.
fn resolve_db_path(cli_path: Option<PathBuf>, settings: &EventroSettings) -> PathBuf {
    if let Some(path) = cli_path {
        return path;
    }
    let configured = PathBuf::from(&settings.database.path);
    if configured.is_absolute() {
        configured
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home).join(".eventro").join(configured)
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

fn connection_config(settings: &EventroSettings) -> ConnectionConfig {
    ConnectionConfig {
        pool_size: settings.database.pool_size,
        busy_timeout_ms: settings.database.busy_timeout_ms,
        cache_size_kib: settings.database.cache_size_kib,
    }
}

fn server_config(cli_host: Option<String>, cli_port: Option<u16>, settings: &EventroSettings) -> ServerConfig {
    let mut config = ServerConfig::from_settings(settings);
    if let Some(host) = cli_host {
        config.host = host;
    }
    if let Some(port) = cli_port {
        config.port = port;
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Load settings early (needed for log level before logging init).
    let settings_path = args
        .settings_path
        .unwrap_or_else(eventro_settings::loader::settings_path);
    let settings =
        eventro_settings::loader::load_settings_from_path(&settings_path).unwrap_or_default();

    init_subscriber(settings.logging.level.as_filter_str());

    // Database.
    let db_path = resolve_db_path(args.db_path, &settings);
    ensure_parent_dir(&db_path)?;
    let db_str = db_path.to_string_lossy();
    let pool =
        new_file(&db_str, &connection_config(&settings)).context("Failed to open database")?;
    let applied = {
        let conn = pool.get().context("Failed to get DB connection")?;
        run_migrations(&conn).context("Failed to run migrations")?
    };
    tracing::info!(path = %db_path.display(), migrations_applied = applied, "database ready");

    let store = Arc::new(Store::new(pool));

    // Metrics recorder must be installed before the first request is served.
    let metrics = eventro_server::metrics::install_recorder();

    // Build and start the server.
    let config = server_config(args.host, args.port, &settings);
    let server = EventroServer::new(config, store, metrics);

    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!("Eventro listening on http://{addr}");

    // Wait for shutdown signal.
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    let drained = server
        .shutdown()
        .graceful_shutdown(vec![handle], DEFAULT_SHUTDOWN_TIMEOUT)
        .await;

    tracing::info!(drained, "Shutdown complete");
    Ok(())
}

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cli_defaults_to_no_overrides() {
        let cli = Cli::parse_from(["eventro"]);
        assert_eq!(cli.host, None);
        assert_eq!(cli.port, None);
        assert_eq!(cli.db_path, None);
        assert_eq!(cli.settings_path, None);
    }

    #[test]
    fn cli_custom_host_and_port() {
        let cli = Cli::parse_from(["eventro", "--host", "0.0.0.0", "--port", "8080"]);
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(8080));
    }

    #[test]
    fn cli_db_path() {
        let cli = Cli::parse_from(["eventro", "--db-path", "/tmp/test.db"]);
        assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/test.db")));
    }

    #[test]
    fn resolve_db_path_prefers_cli() {
        let settings = EventroSettings::default();
        let path = resolve_db_path(Some(PathBuf::from("/tmp/cli.db")), &settings);
        assert_eq!(path, PathBuf::from("/tmp/cli.db"));
    }

    #[test]
    fn resolve_db_path_relative_goes_under_eventro_dir() {
        let settings = EventroSettings::default();
        let path = resolve_db_path(None, &settings);
        assert!(path.to_string_lossy().contains(".eventro"));
        assert!(path.to_string_lossy().ends_with("eventro.db"));
    }

    #[test]
    fn resolve_db_path_absolute_used_as_is() {
        let mut settings = EventroSettings::default();
        settings.database.path = "/var/lib/eventro/data.db".to_string();
        let path = resolve_db_path(None, &settings);
        assert_eq!(path, PathBuf::from("/var/lib/eventro/data.db"));
    }

    #[test]
    fn ensure_parent_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("test.db");
        ensure_parent_dir(&path).unwrap();
        assert!(path.parent().unwrap().exists());
    }

    #[test]
    fn connection_config_copies_database_settings() {
        let mut settings = EventroSettings::default();
        settings.database.pool_size = 4;
        settings.database.busy_timeout_ms = 1000;
        let config = connection_config(&settings);
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.busy_timeout_ms, 1000);
        assert_eq!(config.cache_size_kib, 8192);
    }

    #[test]
    fn server_config_cli_overrides_settings() {
        let mut settings = EventroSettings::default();
        settings.server.port = 4000;
        let config = server_config(Some("127.0.0.1".into()), Some(0), &settings);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 0);
    }

    #[test]
    fn server_config_falls_back_to_settings() {
        let settings = EventroSettings::default();
        let config = server_config(None, None, &settings);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 4000);
    }

    #[test]
    fn server_creates_db_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("new.db");
        assert!(!db_path.exists());

        let db_str = db_path.to_string_lossy();
        let pool = new_file(&db_str, &ConnectionConfig::default()).unwrap();
        let conn = pool.get().unwrap();
        let _ = run_migrations(&conn).unwrap();

        assert!(db_path.exists());
    }

    #[test]
    fn server_runs_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db_str = db_path.to_string_lossy();
        let pool = new_file(&db_str, &ConnectionConfig::default()).unwrap();
        let conn = pool.get().unwrap();
        let _ = run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='events'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn server_boots_and_responds() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("eventro.db");
        let db_str = db_path.to_string_lossy();
        let pool = new_file(&db_str, &ConnectionConfig::default()).unwrap();
        {
            let conn = pool.get().unwrap();
            let _ = run_migrations(&conn).unwrap();
        }
        let store = Arc::new(Store::new(pool));

        let metrics = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();
        let server = EventroServer::new(ServerConfig::default(), store, metrics);
        let (addr, handle) = server.listen().await.unwrap();

        let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
        assert!(resp.status().is_success());
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");

        let drained = server
            .shutdown()
            .graceful_shutdown(vec![handle], DEFAULT_SHUTDOWN_TIMEOUT)
            .await;
        assert!(drained);
    }
}
