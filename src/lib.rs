/// Switchboard: voice-agent intake for property maintenance
///
/// A conversational-AI phone agent answers tenants' calls and reports each
/// call's lifecycle to this service through webhooks. Switchboard folds
/// those events into one maintenance request per call, flags emergencies
/// and alerts on-call staff, and exposes the requests over a small JSON API.
///
/// ### Modules
///
/// - `webhook`: Payload decoding, field extraction and emergency detection
/// - `models`: Maintenance requests and their activity log
/// - `repo`: Repository layer for database operations
/// - `notify`: Emergency alert delivery
/// - `handlers`: Axum handlers for the HTTP surface
/// - `config`, `logging`, `db`: Process setup
///
/// ### Web API
///
/// - `POST /webhooks/voice-agent`: Receive a voice-agent event
/// - `GET /maintenance_requests`: List requests, optionally filtered
/// - `GET /maintenance_requests/{id}`: Get a specific request
/// - `PATCH /maintenance_requests/{id}/status`: Move a request through its workflow
/// - `GET /maintenance_requests/{id}/activity`: A request's activity log
/// - `GET /health`: Liveness probe

/// Configuration module
pub mod config;

/// Database connection module
pub mod db;

/// Data transfer objects
pub mod dto;

/// API error type
pub mod errors;

/// HTTP handlers
pub mod handlers;

/// Tracing setup
pub mod logging;

/// Data models module
pub mod models;

/// Emergency notifications
pub mod notify;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

/// Voice-agent webhook processing
pub mod webhook;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    http::{Method, StatusCode},
    routing::{get, patch, post},
    Router,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::DbPool;
use crate::notify::Notifier;
use crate::webhook::EmergencyClassifier;

/// Migrations compiled into the binary
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Runs the embedded migrations
///
/// ### Errors
///
/// Returns an error if any pending migration fails to apply
pub fn run_migrations(conn: &mut diesel::SqliteConnection) -> anyhow::Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    for version in applied {
        tracing::info!("Applied migration {}", version);
    }

    Ok(())
}

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<DbPool>,
    pub classifier: Arc<EmergencyClassifier>,
    pub notifier: Arc<dyn Notifier>,
    pub default_workspace_id: Option<String>,
}

impl AppState {
    pub fn new(pool: Arc<DbPool>, classifier: EmergencyClassifier, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            pool,
            classifier: Arc::new(classifier),
            notifier,
            default_workspace_id: None,
        }
    }

    /// Builds the state for a configured server process
    pub fn from_config(pool: Arc<DbPool>, config: &Config) -> Self {
        let notifier: Arc<dyn Notifier> = Arc::from(notify::notifier_from_config(config));
        Self {
            default_workspace_id: config.default_workspace_id.clone(),
            ..Self::new(pool, EmergencyClassifier::new(&config.emergency_keywords), notifier)
        }
    }

    pub fn with_default_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.default_workspace_id = Some(workspace_id.into());
        self
    }
}

impl FromRef<AppState> for Arc<DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

/// Creates the application router with all routes configured
///
/// ### Arguments
///
/// * `state` - Database pool, emergency classifier and notifier
///
/// ### Returns
///
/// An Axum Router configured with all API routes, CORS and request tracing
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS]);

    Router::new()
        // Voice platform deliveries; plain OPTIONS probes get an empty 200
        .route(
            "/webhooks/voice-agent",
            post(handlers::voice_agent_webhook_handler).options(|| async { StatusCode::OK }),
        )
        .route("/maintenance_requests", get(handlers::list_maintenance_requests_handler))
        .route("/maintenance_requests/{id}", get(handlers::get_maintenance_request_handler))
        .route(
            "/maintenance_requests/{id}/status",
            patch(handlers::update_maintenance_request_status_handler),
        )
        .route("/maintenance_requests/{id}/activity", get(handlers::list_activity_handler))
        .route("/health", get(handlers::health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
