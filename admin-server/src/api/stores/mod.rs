//! 店铺管理 API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/stores | GET/POST | 列表 / 创建 |
//! | /api/stores/{id} | GET/PUT/DELETE | 查询 / 修改 / 删除 |
//! | /api/stores/{id}/order | GET/POST | 展示顺序查询 / 重排 |
//! | /api/stores/{id}/pause | POST | 暂停 |
//! | /api/stores/{id}/resume | POST | 恢复 |
//! | /api/stores/{id}/images | POST | 图片上传 (multipart) |
//! | /api/stores/bulk-* | GET/POST | 批量导出/修改/删除/暂停/恢复/导入 |

mod bulk;
mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stores", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/bulk-export", get(bulk::export))
        .route("/bulk-update", post(bulk::update))
        .route("/bulk-delete", post(bulk::delete))
        .route("/bulk-pause", post(bulk::pause))
        .route("/bulk-resume", post(bulk::resume))
        .route("/bulk-import", post(bulk::import))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route(
            "/{id}/order",
            get(handler::get_order).post(handler::set_order),
        )
        .route("/{id}/pause", post(handler::pause))
        .route("/{id}/resume", post(handler::resume))
        .route("/{id}/images", post(handler::upload_images))
}
