//! Superadmin credential record
//!
//! 单条特权账号记录。口令为明文比对，不做散列 —
//! 该后台部署在受信内网，口令策略由运营方自行负责。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Superadmin {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

/// POST /api/superadmin/update 请求体 — password 省略时保留旧口令
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuperadminUpdate {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}
