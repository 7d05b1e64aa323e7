//! Superadmin API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::json;

use crate::core::ServerState;
use crate::db::models::{NewActivityLog, Superadmin, SuperadminUpdate};
use crate::db::repository::{ActivityLogRepository, SuperadminRepository};
use crate::utils::{AppError, AppResult};

/// GET /api/superadmin/info
pub async fn info(State(state): State<ServerState>) -> AppResult<Json<Superadmin>> {
    SuperadminRepository::new(state.store.clone())
        .info()
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("Superadmin account is not configured"))
}

#[derive(Debug, Deserialize)]
pub struct CheckBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/superadmin/check - 明文口令登录校验
pub async fn check(
    State(state): State<ServerState>,
    Json(body): Json<CheckBody>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = SuperadminRepository::new(state.store.clone());
    let ok = repo.check(&body.username, &body.password).await;

    if ok {
        tracing::info!(username = %body.username, "Superadmin login succeeded");
        ActivityLogRepository::new(state.store.clone())
            .record_best_effort(NewActivityLog::admin(
                "admin",
                "Superadmin login",
                format!("Superadmin '{}' logged in.", body.username),
            ))
            .await;
        Ok(Json(json!({ "success": true, "message": "Login succeeded" })))
    } else {
        tracing::warn!(username = %body.username, "Superadmin login failed");
        Ok(Json(json!({ "success": false, "message": "Login failed" })))
    }
}

/// POST /api/superadmin/update - 替换账号记录
pub async fn update(
    State(state): State<ServerState>,
    Json(body): Json<SuperadminUpdate>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = SuperadminRepository::new(state.store.clone());
    let admin = repo.update(body).await?;

    ActivityLogRepository::new(state.store.clone())
        .record_best_effort(NewActivityLog::admin(
            "admin",
            "Update superadmin",
            format!("Superadmin account updated ('{}').", admin.username),
        ))
        .await;

    Ok(Json(json!({
        "success": true,
        "data": {
            "username": admin.username,
            "createdAt": admin.created_at,
            "lastModified": admin.last_modified,
        },
        "message": "Superadmin account updated",
    })))
}
