//! HTTP API Server
//!
//! Builds the axum router over the shared [`AppState`] and runs it on the
//! tokio runtime until Ctrl-C or SIGTERM.
//!
//! ## Running the Server
//!
//! ```bash
//! # Defaults: 0.0.0.0:8080, open uploads
//! inventario
//!
//! # Protected uploads and a restricted origin list
//! ADMIN_TOKEN=s3cret ALLOWED_ORIGINS=https://panel.example inventario --port 9000
//! ```

use crate::api::auth::AuthPolicy;
use crate::api::handlers::*;
use crate::config::{CorsPolicy, ServerConfig};
use crate::error::{InventoryError, Result};
use crate::store::DatasetStore;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// API HTTP Server
pub struct ApiServer {
    /// Configuration
    config: ServerConfig,
    /// Shared application state
    state: SharedState,
}

impl ApiServer {
    /// Create a new API server, reading the dashboard page once
    pub fn new(config: ServerConfig) -> Self {
        let auth = AuthPolicy::from_token(config.admin_token.as_deref());
        if auth.is_open() {
            tracing::warn!(
                "ADMIN_TOKEN is unset or still the placeholder; uploads are open to anyone. \
                 Set a real token before exposing this server."
            );
        }

        let state = Arc::new(AppState::new(
            DatasetStore::new(config.default_data_path.clone()),
            auth,
            config.load_index_html(),
            config.max_body_bytes,
        ));

        Self { config, state }
    }

    /// Get shared state
    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    /// Router with every endpoint and middleware attached
    pub fn router(&self) -> Router {
        build_router(self.state(), &self.config)
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> Result<()> {
        let addr = self.config.listen_address();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| InventoryError::server(&addr, e))?;

        tracing::info!(
            address = %addr,
            default_data = %self.config.default_data_path.display(),
            max_upload_bytes = self.config.max_body_bytes,
            "Inventario listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| InventoryError::server(&addr, e))?;

        tracing::info!("API server shut down");
        Ok(())
    }
}

/// Assemble routes, CORS, the upload cap and request tracing
pub fn build_router(state: SharedState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/delegaciones", get(handle_delegations))
        .route("/estado", get(handle_status_counts))
        .route("/ubicacion", get(handle_location_counts))
        .route("/destino", get(handle_destination_counts))
        .route("/subir", post(handle_upload))
        .route("/descargar", get(handle_download))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(policy: &CorsPolicy) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([CONTENT_DISPOSITION]);

    match policy {
        CorsPolicy::AllowAll => layer.allow_origin(Any),
        CorsPolicy::Origins(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(AllowOrigin::list(origins))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
