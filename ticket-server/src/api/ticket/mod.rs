//! Ticket API Module

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Ticket router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/ticket", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/print", post(handler::print))
        .route("/preview", post(handler::preview))
}
