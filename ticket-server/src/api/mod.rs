//! API routes
//!
//! - [`health`] - liveness
//! - [`printer`] - detect, connect, disconnect, status, test page
//! - [`ticket`] - print and preview sale tickets
//! - [`config`] - business and ticket configuration

pub mod config;
pub mod health;
pub mod printer;
pub mod ticket;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;

use crate::core::ServerState;

pub use crate::utils::{AppResponse, AppResult};

/// HTTP request log middleware
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(printer::router())
        .merge(ticket::router())
        .merge(config::router())
}

/// Build the router bound to the server state
pub fn build_router(state: ServerState) -> Router {
    build_app()
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_request))
}
