//! Whole-document and current-store handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::json;

use crate::core::ServerState;
use crate::db::models::{Document, NewActivityLog, Store};
use crate::db::repository::{ActivityLogRepository, StoreRepository};
use crate::db::migrate;
use crate::utils::{AppError, AppResult};

/// GET /api/data - 返回整个文档
pub async fn get_data(State(state): State<ServerState>) -> Json<Document> {
    Json(state.store.read().await)
}

/// POST /api/data - 整文档替换 (店铺切换的前端兼容路径)
pub async fn post_data(
    State(state): State<ServerState>,
    Json(mut payload): Json<serde_json::Value>,
) -> AppResult<Json<serde_json::Value>> {
    if payload.get("currentStoreId").is_none() {
        return Err(AppError::validation("currentStoreId is required"));
    }

    migrate::migrate(&mut payload);
    let document: Document = serde_json::from_value(payload)
        .map_err(|e| AppError::validation(format!("Invalid document: {}", e)))?;

    state.store.replace(&document).await?;
    Ok(Json(json!({ "success": true, "message": "Data updated" })))
}

/// GET /api/current-store - 当前选中的店铺
pub async fn get_current_store(
    State(state): State<ServerState>,
) -> AppResult<Json<Option<Store>>> {
    let repo = StoreRepository::new(state.store.clone());
    Ok(Json(repo.current().await))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCurrentStore {
    pub store_id: Option<String>,
}

/// POST /api/current-store - 切换当前店铺
pub async fn post_current_store(
    State(state): State<ServerState>,
    Json(payload): Json<SetCurrentStore>,
) -> AppResult<Json<serde_json::Value>> {
    let store_id = payload
        .store_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::validation("storeId is required"))?;

    let repo = StoreRepository::new(state.store.clone());
    let (old_store, new_store) = repo.set_current(&store_id).await?;

    let old_name = old_store
        .map(|s| s.name)
        .unwrap_or_else(|| "(none)".to_string());
    ActivityLogRepository::new(state.store.clone())
        .record_best_effort(
            NewActivityLog::admin(
                "store",
                "Switch current store",
                format!("Switched current store: {} → {}", old_name, new_store.name),
            )
            .target("store", &new_store.id, &new_store.name)
            .details(json!({
                "oldStoreName": old_name,
                "newStoreId": new_store.id,
                "newStoreName": new_store.name,
            })),
        )
        .await;

    Ok(Json(json!({ "success": true, "storeId": store_id })))
}
