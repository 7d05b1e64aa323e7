//! Store model

use serde::{Deserialize, Serialize};

/// 店铺运营状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    #[default]
    Active,
    Paused,
}

/// 单个租户店铺记录
///
/// `order` 决定前台展示顺序，重排时会被压缩为连续的 0..N-1。
/// 未识别的历史字段通过 `extra` 原样保留，保证 save(load()) 不丢数据。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: StoreStatus,
    /// 暂停时刻，仅 paused 状态下存在
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_at: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StoreStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreStatus::Active => "active",
            StoreStatus::Paused => "paused",
        }
    }
}

impl Store {
    pub fn is_paused(&self) -> bool {
        self.status == StoreStatus::Paused
    }
}

/// POST /api/stores 请求体
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCreate {
    /// 必填；为空时仓库层报 400
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// PUT /api/stores/{id} 请求体 — 只更新出现的字段
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreUpdate {
    pub name: Option<String>,
    pub subtitle: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: Option<StoreStatus>,
}

impl StoreUpdate {
    /// 没有任何字段出现
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.subtitle.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.status.is_none()
    }

    /// 应用到店铺，返回实际变更的字段名 (活动日志用)
    pub fn apply(&self, store: &mut Store) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if let Some(name) = &self.name
            && *name != store.name
        {
            store.name = name.clone();
            changed.push("name");
        }
        if let Some(subtitle) = &self.subtitle
            && *subtitle != store.subtitle
        {
            store.subtitle = subtitle.clone();
            changed.push("subtitle");
        }
        if let Some(phone) = &self.phone
            && *phone != store.phone
        {
            store.phone = phone.clone();
            changed.push("phone");
        }
        if let Some(address) = &self.address
            && *address != store.address
        {
            store.address = address.clone();
            changed.push("address");
        }
        if let Some(status) = self.status
            && status != store.status
        {
            store.status = status;
            changed.push("status");
        }
        changed
    }
}

/// bulk-import 的单条输入 (JSON 与 CSV 共用)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreImport {
    pub name: String,
    pub subtitle: String,
    pub phone: String,
    pub address: String,
    pub status: Option<StoreStatus>,
}
