//! QR 码 API 模块

mod handler;

use axum::{
    Router,
    routing::{delete, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/qr/generate", post(handler::generate))
        .route("/api/qr/{id}", delete(handler::remove))
}
