//! Configuration API Module
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /api/config/business | GET, PUT | business identity |
//! | /api/config/ticket | GET, PUT | ticket layout |
//! | /api/config/all | GET | both |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Configuration router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/config", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/business",
            get(handler::get_business).put(handler::update_business),
        )
        .route("/ticket", get(handler::get_ticket).put(handler::update_ticket))
        .route("/all", get(handler::get_all))
}
