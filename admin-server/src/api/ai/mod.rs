//! AI 文案 API 模块

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/ai/generate-content", post(handler::generate_content))
}
