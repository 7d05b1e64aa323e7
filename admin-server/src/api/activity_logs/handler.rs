//! Activity Log API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::json;

use crate::core::ServerState;
use crate::db::models::NewActivityLog;
use crate::db::repository::{ActivityLogRepository, StoreRepository};
use crate::utils::{AppError, AppResult};

const DEFAULT_PAGE_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// GET /api/activity-logs?page=&limit= - 分页查询 (最新在前)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1);

    let (logs, total) = ActivityLogRepository::new(state.store.clone())
        .list(page, limit)
        .await;

    Ok(Json(json!({
        "logs": logs,
        "total": total,
        "page": page,
        "limit": limit,
        "totalPages": total.div_ceil(limit),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLogBody {
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// POST /api/activity-logs - 手动追加一条日志
pub async fn create(
    State(state): State<ServerState>,
    Json(body): Json<CreateLogBody>,
) -> AppResult<Json<serde_json::Value>> {
    let store_id = body
        .store_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::validation("storeId and action are required"))?;
    let action = body
        .action
        .filter(|a| !a.is_empty())
        .ok_or_else(|| AppError::validation("storeId and action are required"))?;

    let store = StoreRepository::new(state.store.clone())
        .get(&store_id)
        .await?;

    let entry = ActivityLogRepository::new(state.store.clone())
        .record(
            NewActivityLog::admin("store", &action, body.details.unwrap_or_default())
                .target("store", &store.id, &store.name),
        )
        .await?;

    Ok(Json(json!({ "success": true, "data": entry })))
}
