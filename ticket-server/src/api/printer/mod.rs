//! Printer API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Printer router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/printer", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/detect", get(handler::detect))
        .route("/connect", post(handler::connect))
        .route("/disconnect", post(handler::disconnect))
        .route("/status", get(handler::status))
        .route("/test", post(handler::test_print))
}
