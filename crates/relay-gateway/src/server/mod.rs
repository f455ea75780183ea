//! Gateway server setup
//!
//! Provides the main WebSocket server configuration and routes.

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use axum::{routing::get, Router};
use relay_common::{AppConfig, AppError};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolve the configured listen address
pub async fn resolve_address(config: &AppConfig) -> Result<SocketAddr, AppError> {
    let address = config.gateway.address();

    let resolved = tokio::net::lookup_host(&address)
        .await
        .map_err(|e| AppError::invalid_address(&address, e))?
        .next()
        .ok_or_else(|| AppError::invalid_address(&address, "no addresses resolved"));
    resolved
}

/// Serve `app` on an already bound listener
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), AppError> {
    axum::serve(listener, app).await.map_err(AppError::Server)
}

/// Run the gateway server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    tracing::info!("Starting Gateway server on {}", addr);

    let listener = TcpListener::bind(addr).await.map_err(|source| AppError::Bind {
        addr: addr.to_string(),
        source,
    })?;

    tracing::info!("Gateway listening on ws://{}/gateway", addr);

    serve(listener, app).await
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = resolve_address(&config).await?;

    let state = GatewayState::new(config);
    let app = create_app(state);

    run_server(app, addr).await
}
