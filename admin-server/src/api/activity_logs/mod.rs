//! 活动日志 API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/activity-logs",
        get(handler::list).post(handler::create),
    )
}
