//! Bulk store operations
//!
//! 每个批量端点都在单次 load/save 周期内完成全部逐项变更，
//! 并把数量与店名聚合进一条活动日志。

use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::core::ServerState;
use crate::db::models::{NewActivityLog, StoreImport, StoreStatus, StoreUpdate};
use crate::db::repository::{ActivityLogRepository, BulkOutcome, StoreRepository};
use crate::utils::{AppError, AppResult, time};

fn repo(state: &ServerState) -> StoreRepository {
    StoreRepository::new(state.store.clone())
}

/// 店名摘要: 前 5 个 + 余量
fn summarize_names(names: &[String]) -> String {
    let head = names.iter().take(5).cloned().collect::<Vec<_>>().join(", ");
    if names.len() > 5 {
        format!("{} and {} more", head, names.len() - 5)
    } else {
        head
    }
}

async fn record_bulk(
    state: &ServerState,
    action: &str,
    description: String,
    outcome: &BulkOutcome,
    details: serde_json::Value,
) {
    ActivityLogRepository::new(state.store.clone())
        .record_best_effort(
            NewActivityLog::admin("bulk", action, description)
                .target("stores", "bulk", format!("{} stores", outcome.count))
                .details(details),
        )
        .await;
}

// ========== Export ==========

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: Option<String>,
}

/// GET /api/stores/bulk-export?format=json|csv
pub async fn export(
    State(state): State<ServerState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let stores = repo(&state).list().await;
    let count = stores.len();
    let format = query.format.as_deref().unwrap_or("json");

    let response = if format == "csv" {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["id", "name", "subtitle", "phone", "address", "status", "createdAt"])
            .map_err(|e| AppError::internal(format!("CSV write failed: {}", e)))?;
        for store in &stores {
            writer
                .write_record([
                    store.id.as_str(),
                    store.name.as_str(),
                    store.subtitle.as_str(),
                    store.phone.as_str(),
                    store.address.as_str(),
                    store.status.as_str(),
                    store.created_at.as_str(),
                ])
                .map_err(|e| AppError::internal(format!("CSV write failed: {}", e)))?;
        }
        let csv_bytes = writer
            .into_inner()
            .map_err(|e| AppError::internal(format!("CSV write failed: {}", e)))?;

        // UTF-8 BOM 前缀，Excel 兼容
        let mut body = "\u{feff}".to_string().into_bytes();
        body.extend_from_slice(&csv_bytes);

        (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"stores.csv\"",
                ),
            ],
            body,
        )
            .into_response()
    } else {
        Json(json!({
            "exportedAt": time::now_iso(),
            "totalCount": count,
            "stores": stores,
        }))
        .into_response()
    };

    let outcome = BulkOutcome {
        count,
        names: Vec::new(),
    };
    record_bulk(
        &state,
        "Bulk export",
        format!("Exported {} stores ({} format).", count, format.to_uppercase()),
        &outcome,
        json!({ "exportFormat": format, "exportedCount": count }),
    )
    .await;

    Ok(response)
}

// ========== Update ==========

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateBody {
    #[serde(default)]
    pub store_ids: Vec<String>,
    #[serde(default)]
    pub updates: StoreUpdate,
}

/// POST /api/stores/bulk-update
pub async fn update(
    State(state): State<ServerState>,
    Json(body): Json<BulkUpdateBody>,
) -> AppResult<Json<serde_json::Value>> {
    if body.store_ids.is_empty() || body.updates.is_empty() {
        return Err(AppError::validation("storeIds and updates are required"));
    }

    let outcome = repo(&state)
        .bulk_update(body.store_ids.clone(), body.updates)
        .await?;

    record_bulk(
        &state,
        "Bulk update",
        format!(
            "Updated {} stores: {}",
            outcome.count,
            summarize_names(&outcome.names)
        ),
        &outcome,
        json!({ "storeIds": body.store_ids, "updatedCount": outcome.count }),
    )
    .await;

    Ok(Json(json!({ "success": true, "updatedCount": outcome.count })))
}

// ========== Delete / Pause / Resume ==========

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkIdsBody {
    #[serde(default)]
    pub store_ids: Vec<String>,
}

/// POST /api/stores/bulk-delete
pub async fn delete(
    State(state): State<ServerState>,
    Json(body): Json<BulkIdsBody>,
) -> AppResult<Json<serde_json::Value>> {
    if body.store_ids.is_empty() {
        return Err(AppError::validation("storeIds is required"));
    }

    let outcome = repo(&state).bulk_delete(body.store_ids.clone()).await?;

    record_bulk(
        &state,
        "Bulk delete",
        format!(
            "Deleted {} stores: {}",
            outcome.count,
            summarize_names(&outcome.names)
        ),
        &outcome,
        json!({ "storeIds": body.store_ids, "deletedCount": outcome.count }),
    )
    .await;

    Ok(Json(json!({ "success": true, "deletedCount": outcome.count })))
}

/// POST /api/stores/bulk-pause
pub async fn pause(
    State(state): State<ServerState>,
    Json(body): Json<BulkIdsBody>,
) -> AppResult<Json<serde_json::Value>> {
    if body.store_ids.is_empty() {
        return Err(AppError::validation("storeIds is required"));
    }

    let outcome = repo(&state)
        .bulk_set_status(body.store_ids.clone(), StoreStatus::Paused)
        .await?;

    record_bulk(
        &state,
        "Bulk pause",
        format!(
            "Paused {} stores: {}",
            outcome.count,
            summarize_names(&outcome.names)
        ),
        &outcome,
        json!({ "storeIds": body.store_ids, "pausedCount": outcome.count }),
    )
    .await;

    Ok(Json(json!({ "success": true, "pausedCount": outcome.count })))
}

/// POST /api/stores/bulk-resume
pub async fn resume(
    State(state): State<ServerState>,
    Json(body): Json<BulkIdsBody>,
) -> AppResult<Json<serde_json::Value>> {
    if body.store_ids.is_empty() {
        return Err(AppError::validation("storeIds is required"));
    }

    let outcome = repo(&state)
        .bulk_set_status(body.store_ids.clone(), StoreStatus::Active)
        .await?;

    record_bulk(
        &state,
        "Bulk resume",
        format!(
            "Resumed {} stores: {}",
            outcome.count,
            summarize_names(&outcome.names)
        ),
        &outcome,
        json!({ "storeIds": body.store_ids, "resumedCount": outcome.count }),
    )
    .await;

    Ok(Json(json!({ "success": true, "resumedCount": outcome.count })))
}

// ========== Import ==========

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkImportBody {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub csv_data: Option<String>,
    #[serde(default)]
    pub stores: Option<Vec<StoreImport>>,
}

/// POST /api/stores/bulk-import - JSON 数组或内嵌 CSV 文本
pub async fn import(
    State(state): State<ServerState>,
    Json(body): Json<BulkImportBody>,
) -> AppResult<Json<serde_json::Value>> {
    let rows = if body.format.as_deref() == Some("csv") {
        let csv_data = body
            .csv_data
            .filter(|d| !d.is_empty())
            .ok_or_else(|| AppError::validation("csvData is required"))?;
        parse_csv_rows(&csv_data)?
    } else {
        body.stores.unwrap_or_default()
    };

    if rows.is_empty() {
        return Err(AppError::validation("stores is required"));
    }

    let format = body.format.unwrap_or_else(|| "json".into());
    let outcome = repo(&state).bulk_import(rows).await?;

    record_bulk(
        &state,
        "Bulk import",
        format!(
            "Imported {} stores ({} format): {}",
            outcome.count,
            format.to_uppercase(),
            summarize_names(&outcome.names)
        ),
        &outcome,
        json!({ "importedCount": outcome.count, "importedStores": outcome.names }),
    )
    .await;

    Ok(Json(json!({ "success": true, "importedCount": outcome.count })))
}

fn parse_csv_rows(csv_data: &str) -> AppResult<Vec<StoreImport>> {
    let csv_data = csv_data.strip_prefix('\u{feff}').unwrap_or(csv_data);
    let mut reader = csv::Reader::from_reader(csv_data.as_bytes());
    let mut rows = Vec::new();
    for row in reader.deserialize::<StoreImport>() {
        rows.push(row.map_err(|e| AppError::validation(format!("Invalid CSV row: {}", e)))?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_caps_at_five_names() {
        let names: Vec<String> = (0..7).map(|i| format!("s{}", i)).collect();
        assert_eq!(summarize_names(&names), "s0, s1, s2, s3, s4 and 2 more");
        assert_eq!(summarize_names(&names[..2]), "s0, s1");
    }

    #[test]
    fn csv_rows_parse_with_bom_and_status() {
        let csv = "\u{feff}name,subtitle,phone,address,status\nDeli,,123,Main St,paused\nCafe,,,,\n";
        let rows = parse_csv_rows(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Deli");
        assert_eq!(rows[0].status, Some(StoreStatus::Paused));
        assert_eq!(rows[1].status, None);
    }
}
