//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查接口
//! - [`data`] - 整文档读写、当前店铺
//! - [`stores`] - 店铺管理接口 (CRUD / 暂停恢复 / 重排 / 图片 / 批量)
//! - [`settings`] - 店铺设置接口
//! - [`activity_logs`] - 活动日志接口
//! - [`superadmin`] - 超级管理员账号接口
//! - [`qr`] - QR 码生成接口
//! - [`ai`] - AI 文案生成接口
//! - [`static_files`] - 静态文件回退

pub mod activity_logs;
pub mod ai;
pub mod data;
pub mod health;
pub mod qr;
pub mod settings;
pub mod static_files;
pub mod stores;
pub mod superadmin;

use axum::Router;

use crate::core::ServerState;

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(data::router())
        .merge(stores::router())
        .merge(settings::router())
        .merge(activity_logs::router())
        .merge(superadmin::router())
        .merge(qr::router())
        .merge(ai::router())
}
