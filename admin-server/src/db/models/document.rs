//! The top-level persisted document

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::activity_log::ActivityLog;
use super::settings::StoreSettings;
use super::store::Store;
use super::superadmin::Superadmin;

/// 持久化文档 — 所有状态的唯一真身
///
/// 不变量: `current_store_id` 为 null 或等于某个 `stores[i].id`；
/// 删除当前店铺时该字段被置空。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub stores: Vec<Store>,
    #[serde(default)]
    pub current_store_id: Option<String>,
    #[serde(default)]
    pub settings: BTreeMap<String, StoreSettings>,
    #[serde(default)]
    pub activity_logs: Vec<ActivityLog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superadmin: Option<Superadmin>,
    /// 历史遗留的顶层键 (deliveryOrders 等) 原样保留
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Document {
    pub fn store(&self, id: &str) -> Option<&Store> {
        self.stores.iter().find(|s| s.id == id)
    }

    pub fn store_mut(&mut self, id: &str) -> Option<&mut Store> {
        self.stores.iter_mut().find(|s| s.id == id)
    }

    /// 检查 `current_store_id` 不变量
    pub fn current_store_id_is_valid(&self) -> bool {
        match &self.current_store_id {
            None => true,
            Some(id) => self.stores.iter().any(|s| s.id == *id),
        }
    }
}
