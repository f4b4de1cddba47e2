pub mod routes;

use std::net::SocketAddr;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use common::Result;
use engine::ScannerHandle;

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub scanner: ScannerHandle,
}

/// The full dashboard router: JSON API, health check and embedded front end.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .merge(routes::api_router())
        .merge(routes::health_router())
        .merge(routes::static_router())
        .with_state(state)
        .layer(cors)
        .layer(CompressionLayer::new())
}

/// Build and run the Axum dashboard server.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Dashboard listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
