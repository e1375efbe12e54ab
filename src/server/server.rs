//! Desk HTTP server with axum router and graceful shutdown.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::error::ServerError;
use super::handlers::{
    get_events_sse, get_health, get_request, list_knowledge, list_requests, post_answer,
    post_request, post_unresolved, AppState,
};
use crate::config::ServerSection;
use crate::desk::HelpDesk;

/// HTTP boundary for the help desk.
#[derive(Debug)]
pub struct DeskServer {
    config: ServerSection,
    state: AppState,
    cancel: CancellationToken,
}

impl DeskServer {
    /// Create a server with default configuration that stops when `cancel` fires.
    #[must_use]
    pub fn new(desk: Arc<HelpDesk>, cancel: CancellationToken) -> Self {
        Self {
            config: ServerSection::default(),
            state: AppState::new(desk),
            cancel,
        }
    }

    /// Set the server configuration (builder pattern).
    #[must_use]
    pub fn with_config(mut self, config: ServerSection) -> Self {
        self.config = config;
        self
    }

    /// Get the configured address as a string.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the axum router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        let router = Router::new()
            .route("/api/requests", post(post_request).get(list_requests))
            .route("/api/requests/:id", get(get_request))
            .route("/api/requests/:id/answer", post(post_answer))
            .route("/api/requests/:id/unresolved", post(post_unresolved))
            .route("/api/knowledge", get(list_knowledge))
            .route("/api/events", get(get_events_sse))
            .route("/health", get(get_health))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.cors_permissive {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Bind to the configured address and serve until cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or serve.
    pub async fn run(self) -> Result<(), ServerError> {
        let address = self.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::BindError {
                address: address.clone(),
                source,
            })?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if serving fails.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let cancel = self.cancel.clone();
        let app = self.build_router();

        if let Ok(addr) = listener.local_addr() {
            tracing::info!(address = %addr, "Server listening");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                tracing::info!("Server shutting down gracefully");
            })
            .await?;
        Ok(())
    }
}
