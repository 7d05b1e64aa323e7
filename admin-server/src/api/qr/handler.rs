//! QR Code API Handlers

use std::path::Path as FsPath;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::json;

use crate::core::ServerState;
use crate::db::models::{NewActivityLog, QrCodeInfo};
use crate::db::repository::{ActivityLogRepository, SettingsRepository, StoreRepository};
use crate::services::qr::DEFAULT_QR_SIZE;
use crate::utils::{AppError, AppResult, time};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// POST /api/qr/generate - 为店铺 URL 生成 QR 码
///
/// 店铺设置里有 mainLogo 且文件在磁盘上时，自动居中合成 logo。
pub async fn generate(
    State(state): State<ServerState>,
    Json(body): Json<GenerateBody>,
) -> AppResult<Json<serde_json::Value>> {
    let store_id = body
        .store_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::validation("storeId and url are required"))?;
    let url = body
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::validation("storeId and url are required"))?;

    let store = StoreRepository::new(state.store.clone())
        .get(&store_id)
        .await?;

    // 店铺 logo 作为 QR 中心图 (路径形如 /assets/...，转相对路径)
    let settings_repo = SettingsRepository::new(state.store.clone());
    let settings = settings_repo.get_or_create(&store_id).await?;
    let logo_path = (!settings.images.main_logo.is_empty())
        .then(|| settings.images.main_logo.trim_start_matches('/').to_string());

    let outcome = state.qr.generate_and_save(
        &url,
        &store_id,
        logo_path.as_deref().map(FsPath::new),
        DEFAULT_QR_SIZE,
    );

    if !outcome.success {
        return Err(AppError::external(outcome.message));
    }
    let filepath = outcome.filepath.unwrap_or_default();
    let qr_url = outcome.url.unwrap_or_default();

    let file_size = std::fs::metadata(&filepath).map(|m| m.len()).unwrap_or(0);

    settings_repo
        .set_qr_code(
            &store_id,
            QrCodeInfo {
                url: qr_url.clone(),
                filepath: filepath.clone(),
                created_at: time::now_iso(),
            },
        )
        .await?;

    ActivityLogRepository::new(state.store.clone())
        .record_best_effort(
            NewActivityLog::admin(
                "store",
                "Generate QR code",
                format!("Generated a QR code for store '{}'.", store.name),
            )
            .target("store", &store.id, &store.name)
            .details(json!({ "url": &url, "qrCodeUrl": &qr_url })),
        )
        .await;

    tracing::info!(store_id = %store_id, url = %url, "QR code generated");
    Ok(Json(json!({
        "success": true,
        "data": {
            "qrCodeUrl": qr_url,
            "storeId": store_id,
            "url": url,
            "fileSize": file_size,
        }
    })))
}

/// DELETE /api/qr/{id} - 删除 QR 文件并清掉设置里的记录
pub async fn remove(
    State(state): State<ServerState>,
    Path(store_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let store = StoreRepository::new(state.store.clone())
        .get(&store_id)
        .await?;

    let cleared = SettingsRepository::new(state.store.clone())
        .clear_qr_code(&store_id)
        .await?
        .ok_or_else(|| AppError::not_found("No QR code to delete"))?;

    // 文件删除尽力而为 — 设置里的记录已经清掉
    if !cleared.filepath.is_empty()
        && let Err(e) = std::fs::remove_file(&cleared.filepath)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!(path = %cleared.filepath, error = %e, "Failed to remove QR file");
    }

    ActivityLogRepository::new(state.store.clone())
        .record_best_effort(
            NewActivityLog::admin(
                "store",
                "Delete QR code",
                format!("Deleted the QR code of store '{}'.", store.name),
            )
            .target("store", &store.id, &store.name),
        )
        .await;

    tracing::info!(store_id = %store_id, "QR code deleted");
    Ok(Json(json!({ "success": true, "message": "QR code deleted" })))
}
