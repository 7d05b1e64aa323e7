//! AI Content API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::json;

use crate::core::ServerState;
use crate::db::models::NewActivityLog;
use crate::db::repository::ActivityLogRepository;
use crate::services::ai::{AiExample, AiGenerateRequest};
use crate::utils::{AppResult, time};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentBody {
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(flatten)]
    pub request: AiGenerateRequest,
}

/// POST /api/ai/generate-content - 尽力而为的文案生成
///
/// 失败不报 5xx: AI 只是增值功能，前端按 `success:false` 降级展示。
pub async fn generate_content(
    State(state): State<ServerState>,
    Json(body): Json<GenerateContentBody>,
) -> AppResult<Json<serde_json::Value>> {
    // 其他店铺已保存的文案作为 few-shot 示例 (最多 5 条)
    let examples = collect_examples(&state, body.store_id.as_deref()).await;

    match state.ai.generate(&body.request, &examples).await {
        Ok(content) => {
            if let Some(store_id) = &body.store_id {
                ActivityLogRepository::new(state.store.clone())
                    .record_best_effort(
                        NewActivityLog::admin(
                            "ai",
                            "Generate AI content",
                            format!(
                                "Generated AI copy for store '{}'.",
                                body.request.store_name
                            ),
                        )
                        .target("store", store_id, &body.request.store_name),
                    )
                    .await;
            }

            Ok(Json(json!({
                "success": true,
                "content": content,
                "timestamp": time::now_iso(),
            })))
        }
        Err(e) => {
            tracing::warn!(error = %e, "AI content generation failed");
            Ok(Json(json!({ "success": false, "error": e.to_string() })))
        }
    }
}

/// 从其他店铺的已有设置里取真实文案示例
async fn collect_examples(state: &ServerState, exclude_store: Option<&str>) -> Vec<AiExample> {
    let doc = state.store.read().await;
    let mut examples = Vec::new();
    for store in &doc.stores {
        if Some(store.id.as_str()) == exclude_store {
            continue;
        }
        let Some(settings) = doc.settings.get(&store.id) else {
            continue;
        };
        if settings.discount.title.is_empty() && settings.pickup.title.is_empty() {
            continue;
        }
        examples.push(AiExample {
            store_name: store.name.clone(),
            discount_title: settings.discount.title.clone(),
            pickup_title: settings.pickup.title.clone(),
        });
        if examples.len() == 5 {
            break;
        }
    }
    examples
}
