// Server module - HTTP server setup and routing
pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::errors::ServiceError;
use self::state::AppState;

/// Create the Axum application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/votes", get(handlers::get_user_vote).post(handlers::cast_vote))
        .route("/votes/batch", post(handlers::get_user_votes))
        .route("/items/score", get(handlers::item_score))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server on the specified address until ctrl-c
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ServiceError> {
    info!("Server listening on {}", addr);
    info!("- Votes endpoint: http://{}/votes", addr);
    info!("- Health endpoint: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
