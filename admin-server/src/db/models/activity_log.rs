//! Activity log model
//!
//! 面向运营者的操作流水，区别于系统日志：按时间倒序保存在文档里，
//! 上限 1000 条，超出即丢弃最旧的。

use serde::{Deserialize, Serialize};

use crate::utils::time;

/// 活动日志条目
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    /// 日志分类 (store / settings / bulk / admin / ai ...)
    #[serde(rename = "type", default)]
    pub kind: String,
    pub action: String,
    #[serde(default)]
    pub description: String,
    pub timestamp: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    #[serde(default)]
    pub details: serde_json::Value,
}

/// 新日志条目的输入 — ID 和时间戳由仓库生成
#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub kind: String,
    pub action: String,
    pub description: String,
    pub user_id: String,
    pub user_name: String,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub target_name: Option<String>,
    pub details: serde_json::Value,
}

impl NewActivityLog {
    /// 管理员操作的常用构造
    pub fn admin(kind: &str, action: &str, description: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            action: action.to_string(),
            description: description.into(),
            user_id: "admin".to_string(),
            user_name: "admin".to_string(),
            target_type: None,
            target_id: None,
            target_name: None,
            details: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn target(
        mut self,
        target_type: &str,
        target_id: impl Into<String>,
        target_name: impl Into<String>,
    ) -> Self {
        self.target_type = Some(target_type.to_string());
        self.target_id = Some(target_id.into());
        self.target_name = Some(target_name.into());
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    pub fn into_entry(self) -> ActivityLog {
        ActivityLog {
            id: time::new_entity_id("log", 8),
            kind: self.kind,
            action: self.action,
            description: self.description,
            timestamp: time::now_iso(),
            user_id: self.user_id,
            user_name: self.user_name,
            target_type: self.target_type,
            target_id: self.target_id,
            target_name: self.target_name,
            details: self.details,
        }
    }
}
