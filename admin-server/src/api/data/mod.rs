//! 整文档与当前店铺 API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/data", get(handler::get_data).post(handler::post_data))
        .route(
            "/api/current-store",
            get(handler::get_current_store).post(handler::post_current_store),
        )
}
