//! `EventroServer` — Axum HTTP server wiring.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, MatchedPath, Request, State};
use axum::http::{header, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::{Json, Response};
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use eventro_store::Store;

use crate::config::ServerConfig;
use crate::handlers::{conversations, events, tickets};
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer.
    pub store: Arc<Store>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus render handle.
    pub metrics: PrometheusHandle,
    /// Applied schema version, reported by `/health`.
    pub schema_version: u32,
}

/// The main Eventro server.
pub struct EventroServer {
    config: ServerConfig,
    store: Arc<Store>,
    shutdown: Arc<ShutdownCoordinator>,
    metrics: PrometheusHandle,
    start_time: Instant,
}

impl EventroServer {
    /// Create a new server.
    pub fn new(config: ServerConfig, store: Arc<Store>, metrics: PrometheusHandle) -> Self {
        Self {
            config,
            store,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            metrics,
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            store: self.store.clone(),
            shutdown: self.shutdown.clone(),
            start_time: self.start_time,
            metrics: self.metrics.clone(),
            schema_version: eventro_store::migrations::latest_version(),
        };

        Router::new()
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/events", post(events::create_event).get(events::list_events))
            .route(
                "/events/{id}",
                get(events::get_event)
                    .put(events::update_event)
                    .delete(events::delete_event),
            )
            .route(
                "/events/{id}/tickets",
                post(tickets::issue_ticket).get(tickets::list_event_tickets),
            )
            .route(
                "/tickets/{id}",
                get(tickets::get_ticket).delete(tickets::cancel_ticket),
            )
            .route("/users/{user_id}/events", get(events::list_user_events))
            .route("/users/{user_id}/tickets", get(tickets::list_user_tickets))
            .route(
                "/users/{user_id}/conversations",
                get(conversations::list_user_conversations),
            )
            .route("/conversations", post(conversations::open_conversation))
            .route("/conversations/{id}", get(conversations::get_conversation))
            .route(
                "/conversations/{id}/messages",
                post(conversations::send_message).get(conversations::list_messages),
            )
            .route_layer(middleware::from_fn(track_requests))
            .layer(cors_layer(&self.config.allowed_origins))
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes))
            .with_state(state)
    }

    /// Bind and serve. Returns the bound address and the serve task handle.
    ///
    /// The task exits when the shutdown coordinator fires.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let bind = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&bind).await?;
        let addr = listener.local_addr()?;
        info!(%addr, "listening");

        let app = self.router();
        let token = self.shutdown.token();
        let handle = tokio::spawn(async move {
            let shutdown = async move { token.cancelled().await };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!(error = %e, "server error");
            }
        });

        Ok((addr, handle))
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Count every routed request, and every 4xx/5xx response, against the
/// matched route template.
async fn track_requests(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| req.uri().path().to_string(), |m| m.as_str().to_string());
    crate::metrics::record_request(&method, &path);

    let response = next.run(req).await;
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        crate::metrics::record_error(status.as_u16());
    }
    response
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.iter().any(|origin| origin == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time, state.schema_version))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> String {
    crate::metrics::render(&state.metrics)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
