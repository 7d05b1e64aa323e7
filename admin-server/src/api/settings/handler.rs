//! Settings API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::json;

use crate::core::ServerState;
use crate::db::models::{NewActivityLog, SettingsUpdate, SettingsView};
use crate::db::repository::{ActivityLogRepository, SettingsRepository};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsQuery {
    #[serde(default)]
    pub store_id: Option<String>,
}

fn require_store_id(query: &SettingsQuery) -> AppResult<String> {
    query
        .store_id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::validation("storeId is required"))
}

/// GET /api/settings?storeId= - 设置投影；首次读取时播种默认值
pub async fn get_settings(
    State(state): State<ServerState>,
    Query(query): Query<SettingsQuery>,
) -> AppResult<Json<SettingsView>> {
    let store_id = require_store_id(&query)?;
    let view = SettingsRepository::new(state.store.clone())
        .get_or_create(&store_id)
        .await?;
    Ok(Json(view))
}

/// POST /api/settings?storeId= - 按段合并保存
pub async fn save_settings(
    State(state): State<ServerState>,
    Query(query): Query<SettingsQuery>,
    Json(payload): Json<SettingsUpdate>,
) -> AppResult<Json<serde_json::Value>> {
    let store_id = require_store_id(&query)?;

    let repo = SettingsRepository::new(state.store.clone());
    let (view, sections) = repo.update(&store_id, payload).await?;

    ActivityLogRepository::new(state.store.clone())
        .record_best_effort(
            NewActivityLog::admin(
                "settings",
                "Save settings",
                format!(
                    "Saved settings for store '{}' ({}).",
                    view.basic.store_name,
                    if sections.is_empty() {
                        "no sections".to_string()
                    } else {
                        sections.join(", ")
                    }
                ),
            )
            .target("store", &store_id, &view.basic.store_name)
            .details(json!({ "changedSettings": sections })),
        )
        .await;

    tracing::info!(store_id = %store_id, "Settings saved");
    Ok(Json(json!({ "success": true })))
}
