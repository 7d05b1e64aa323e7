//! Store API Handlers

use std::fs;
use std::path::PathBuf;

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Deserialize;
use serde_json::json;

use crate::core::ServerState;
use crate::db::models::{NewActivityLog, Store, StoreCreate, StoreUpdate};
use crate::db::repository::{ActivityLogRepository, SettingsRepository, StoreRepository};
use crate::utils::{AppError, AppResult, time};

/// 上传图片允许的扩展名
const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg"];

fn activity(state: &ServerState) -> ActivityLogRepository {
    ActivityLogRepository::new(state.store.clone())
}

/// GET /api/stores - 按展示顺序返回全部店铺
pub async fn list(State(state): State<ServerState>) -> Json<Vec<Store>> {
    Json(StoreRepository::new(state.store.clone()).list().await)
}

/// POST /api/stores - 创建店铺
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<StoreCreate>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = StoreRepository::new(state.store.clone());
    let store = repo.create(payload).await?;

    activity(&state)
        .record_best_effort(
            NewActivityLog::admin(
                "store",
                "Create store",
                format!("Created store '{}'.", store.name),
            )
            .target("store", &store.id, &store.name)
            .details(json!({ "phone": &store.phone, "address": &store.address })),
        )
        .await;

    tracing::info!(store_id = %store.id, "Store created");
    Ok(Json(json!({ "success": true, "store": store })))
}

/// GET /api/stores/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Store>> {
    let store = StoreRepository::new(state.store.clone()).get(&id).await?;
    Ok(Json(store))
}

/// PUT /api/stores/{id} - 更新出现的字段
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StoreUpdate>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = StoreRepository::new(state.store.clone());
    let (store, changed) = repo.update(&id, payload).await?;

    if !changed.is_empty() {
        activity(&state)
            .record_best_effort(
                NewActivityLog::admin(
                    "store",
                    "Update store",
                    format!(
                        "Updated store '{}' ({}).",
                        store.name,
                        changed.join(", ")
                    ),
                )
                .target("store", &store.id, &store.name)
                .details(json!({ "changedFields": changed })),
            )
            .await;
    }

    Ok(Json(json!({ "success": true, "message": "Store updated" })))
}

/// DELETE /api/stores/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = StoreRepository::new(state.store.clone());
    let store = repo.delete(&id).await?;

    activity(&state)
        .record_best_effort(
            NewActivityLog::admin(
                "store",
                "Delete store",
                format!("Deleted store '{}'.", store.name),
            )
            .target("store", &store.id, &store.name),
        )
        .await;

    tracing::info!(store_id = %id, "Store deleted");
    Ok(Json(json!({ "success": true, "message": "Store deleted" })))
}

/// GET /api/stores/{id}/order - 当前展示顺序
pub async fn get_order(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let store = StoreRepository::new(state.store.clone()).get(&id).await?;
    Ok(Json(json!({
        "storeId": store.id,
        "storeName": store.name,
        "currentOrder": store.order,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetOrder {
    pub new_order: Option<i64>,
}

/// POST /api/stores/{id}/order - 稠密秩重排
pub async fn set_order(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<SetOrder>,
) -> AppResult<Json<serde_json::Value>> {
    let new_order = payload
        .new_order
        .ok_or_else(|| AppError::validation("newOrder is required"))?;

    let repo = StoreRepository::new(state.store.clone());
    let outcome = repo.reorder(&id, new_order).await?;

    activity(&state)
        .record_best_effort(
            NewActivityLog::admin(
                "store",
                "Reorder store",
                format!(
                    "Moved store '{}' from position {} to {}.",
                    outcome.store.name, outcome.old_order, outcome.new_order
                ),
            )
            .target("store", &outcome.store.id, &outcome.store.name)
            .details(json!({ "oldOrder": outcome.old_order, "newOrder": outcome.new_order })),
        )
        .await;

    Ok(Json(json!({ "success": true })))
}

/// POST /api/stores/{id}/pause - 暂停，客户端入口关闭
pub async fn pause(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = StoreRepository::new(state.store.clone());
    let store = repo.pause(&id).await?;

    activity(&state)
        .record_best_effort(
            NewActivityLog::admin(
                "store",
                "Pause store",
                format!("Paused store '{}'. Customer access is blocked.", store.name),
            )
            .target("store", &store.id, &store.name)
            .details(json!({ "pausedAt": store.paused_at })),
        )
        .await;

    tracing::info!(store_id = %id, "Store paused");
    Ok(Json(json!({ "success": true })))
}

/// POST /api/stores/{id}/resume - 恢复运营
pub async fn resume(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = StoreRepository::new(state.store.clone());
    let store = repo.resume(&id).await?;

    activity(&state)
        .record_best_effort(
            NewActivityLog::admin(
                "store",
                "Resume store",
                format!("Resumed store '{}'. Customers can connect again.", store.name),
            )
            .target("store", &store.id, &store.name)
            .details(json!({ "resumedAt": time::now_iso() })),
        )
        .await;

    tracing::info!(store_id = %id, "Store resumed");
    Ok(Json(json!({ "success": true })))
}

/// POST /api/stores/{id}/images - multipart 图片上传
///
/// 字段: `image` (文件) + `imageType` (mainLogo / menuImage / ...)。
/// 文件落到 `<upload_dir>/<storeId>/`，公开路径写进该店的 images 设置。
pub async fn upload_images(
    State(state): State<ServerState>,
    Path(store_id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<serde_json::Value>> {
    let mut image_type: Option<String> = None;
    let mut original_name: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("imageType") => image_type = Some(field.text().await?),
            Some("image") => {
                original_name = field.file_name().map(|s| s.to_string());
                data = Some(field.bytes().await?.to_vec());
            }
            _ => {}
        }
    }

    let image_type =
        image_type.ok_or_else(|| AppError::validation("image and imageType are required"))?;
    let data = data.ok_or_else(|| AppError::validation("image and imageType are required"))?;
    let original_name =
        original_name.ok_or_else(|| AppError::validation("No file uploaded"))?;

    if data.is_empty() {
        return Err(AppError::validation("Empty file provided"));
    }

    let ext = PathBuf::from(&original_name)
        .extension()
        .and_then(|e| e.to_str().map(|s| s.to_lowercase()))
        .unwrap_or_default();
    if !ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::validation("Only image files are allowed"));
    }

    let dir = PathBuf::from(&state.config.upload_dir).join(&store_id);
    fs::create_dir_all(&dir)
        .map_err(|e| AppError::storage(format!("Failed to create upload directory: {}", e)))?;

    let filename = format!("{}_{}_{}", image_type, time::now_millis(), original_name);
    let file_path = dir.join(&filename);
    fs::write(&file_path, &data)
        .map_err(|e| AppError::storage(format!("Failed to save file: {}", e)))?;

    let public_path = format!("/{}", file_path.to_string_lossy().replace('\\', "/"));
    let settings_repo = SettingsRepository::new(state.store.clone());
    let store = settings_repo
        .set_image(&store_id, &image_type, public_path.clone())
        .await?;

    activity(&state)
        .record_best_effort(
            NewActivityLog::admin(
                "store",
                "Upload image",
                format!("Uploaded {} image for store '{}'.", image_type, store.name),
            )
            .target("store", &store.id, &store.name)
            .details(json!({ "imageType": &image_type, "filename": filename })),
        )
        .await;

    tracing::info!(store_id = %store_id, image_type = %image_type, "Image uploaded");
    Ok(Json(json!({ "success": true, "imagePath": public_path })))
}
