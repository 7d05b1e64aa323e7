//! 超级管理员账号 API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/superadmin", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/info", get(handler::info))
        .route("/check", post(handler::check))
        .route("/update", post(handler::update))
}
