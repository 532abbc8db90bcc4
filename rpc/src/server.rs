//! Axum-based RPC server.

use std::sync::Arc;

use agora_governance::GovernanceEngine;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{self, RpcState};
use crate::RpcError;

/// Build the HTTP router over a shared engine.
pub fn router(state: Arc<RpcState>) -> Router {
    Router::new()
        .route(
            "/proposals",
            post(handlers::create_proposal).get(handlers::list_proposals),
        )
        .route("/proposals/:id", get(handlers::get_proposal))
        .route("/proposals/:id/activate", post(handlers::activate_proposal))
        .route(
            "/proposals/:id/votes",
            post(handlers::submit_vote).get(handlers::get_votes),
        )
        .route("/proposals/:id/votes/:voter", get(handlers::get_voter_choice))
        .route(
            "/governance/configs",
            post(handlers::create_config).get(handlers::list_configs),
        )
        .route(
            "/governance/configs/:id/deactivate",
            post(handlers::deactivate_config),
        )
        .route("/governance/config", get(handlers::get_config))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct RpcServer {
    pub host: String,
    pub port: u16,
    state: Arc<RpcState>,
}

impl RpcServer {
    pub fn new(host: impl Into<String>, port: u16, engine: Arc<GovernanceEngine>) -> Self {
        Self {
            host: host.into(),
            port,
            state: Arc::new(RpcState::new(engine)),
        }
    }

    /// Serve until the listener fails. Callers stop it by dropping the future.
    pub async fn start(&self) -> Result<(), RpcError> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        info!(%addr, "RPC server listening");
        axum::serve(listener, router(Arc::clone(&self.state)))
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
