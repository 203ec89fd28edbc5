//! Application startup and lifecycle management.
//!
//! Builds the ledger from its snapshot (or a seed configuration on first
//! boot) and serves the JSON API plus health and metrics endpoints.

use crate::config::Config;
use crate::handlers::{admin, payments, state as state_handlers};
use crate::services::{get_metrics, init_metrics, Ledger, LedgerBook, SnapshotStore};
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use service_core::error::AppError;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Ledger,
    pub config: Config,
}

/// Health check endpoint for Docker/K8s liveness probes.
async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "bookkeeping-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness check endpoint for K8s readiness probes.
async fn readiness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

/// Prometheus metrics endpoint.
async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: Config) -> Result<Self, AppError> {
        init_metrics();

        let store = SnapshotStore::new(config.storage.snapshot_path.clone());
        let book = match store.load().await? {
            Some(mut book) => {
                // Aggregates are derived; rebuilding them on load guards
                // against a snapshot written by an older formula.
                book.full_reconciliation();
                book
            }
            None => {
                let mut book = LedgerBook::default();
                if let Some(seed) = &config.storage.seed_partners {
                    seed.validate()?;
                    book.config = seed.clone();
                    tracing::info!(
                        partners = seed.partners.len(),
                        "Fresh ledger seeded with partner configuration"
                    );
                } else {
                    tracing::warn!(
                        "Fresh ledger with no partner configuration - payments will be \
                         rejected until one is set"
                    );
                }
                book
            }
        };
        let ledger = Ledger::new(book, store);

        let state = AppState {
            ledger,
            config: config.clone(),
        };

        // Bind listener (port 0 = random port for testing)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Bookkeeping service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = Router::new()
            .route("/health", get(health_check))
            .route("/ready", get(readiness_check))
            .route("/metrics", get(metrics_endpoint))
            .route("/api/state", get(state_handlers::get_state))
            .route("/api/history", get(state_handlers::get_history))
            .route("/api/breakdown", get(state_handlers::get_breakdown))
            .route("/api/payments", post(payments::record_payment))
            .route("/api/payments/extra", post(payments::record_extra_payment))
            .route(
                "/api/payments/:id",
                put(payments::edit_payment).delete(payments::delete_payment),
            )
            .route("/api/config", put(admin::update_config))
            .route("/api/reset", post(admin::reset_ledger))
            // The original deployment served a browser client from another
            // origin.
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state);

        axum::serve(self.listener, router).await
    }
}
