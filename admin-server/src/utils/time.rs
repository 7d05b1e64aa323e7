//! 时间与 ID 工具函数
//!
//! 文档中的所有时间戳统一为 RFC 3339 (UTC, 毫秒精度) 字符串，
//! 实体 ID 统一为 `<prefix>_<unix-millis>_<hex>` 形式。

use chrono::{SecondsFormat, Utc};

/// 当前时间的 RFC 3339 字符串 (UTC, 毫秒精度)
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 当前 Unix 毫秒时间戳
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// 文件名用的紧凑时间戳 (`YYYYmmdd_HHMMSS`)
pub fn timestamp_slug() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

/// 生成新实体 ID: `<prefix>_<unix-millis>_<hex>`
///
/// hex 部分取 UUIDv4 的前 `hex_len` 个字符。
pub fn new_entity_id(prefix: &str, hex_len: usize) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, now_millis(), &hex[..hex_len.min(hex.len())])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_has_prefix_and_hex_suffix() {
        let id = new_entity_id("store", 10);
        let parts: Vec<&str> = id.splitn(3, '_').collect();
        assert_eq!(parts[0], "store");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 10);
    }

    #[test]
    fn now_iso_is_utc_millis() {
        let ts = now_iso();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
