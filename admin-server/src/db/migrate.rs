//! 文档字段迁移
//!
//! 历史数据文件用过两套字段名：设置段里带前缀的
//! `discountEnabled` / `pickupTitle`，店铺上的布尔 `isPaused`。
//! 每次加载都在类型化反序列化之前对原始 JSON 跑一遍改名，
//! 迁移必须幂等 — 跑两遍和跑一遍结果相同。

use serde_json::Value;

/// 对原始文档执行全部迁移
pub fn migrate(doc: &mut Value) {
    migrate_settings(doc);
    migrate_stores(doc);
}

/// 设置段字段改名: `discountEnabled` → `enabled` 等
fn migrate_settings(doc: &mut Value) {
    let Some(settings) = doc.get_mut("settings").and_then(Value::as_object_mut) else {
        return;
    };

    for store_settings in settings.values_mut() {
        if let Some(discount) = store_settings.get_mut("discount").and_then(Value::as_object_mut) {
            rename_key(discount, "discountEnabled", "enabled");
            rename_key(discount, "discountTitle", "title");
            rename_key(discount, "discountDescription", "description");
        }
        if let Some(pickup) = store_settings.get_mut("pickup").and_then(Value::as_object_mut) {
            rename_key(pickup, "pickupEnabled", "enabled");
            rename_key(pickup, "pickupTitle", "title");
            rename_key(pickup, "pickupDescription", "description");
        }
    }
}

/// 店铺状态迁移: 布尔 `isPaused` → 枚举 `status`
fn migrate_stores(doc: &mut Value) {
    let Some(stores) = doc.get_mut("stores").and_then(Value::as_array_mut) else {
        return;
    };

    for store in stores.iter_mut() {
        let Some(store) = store.as_object_mut() else {
            continue;
        };

        let was_paused = store.remove("isPaused").and_then(|v| v.as_bool());

        if !store.contains_key("status") {
            let status = match was_paused {
                Some(true) => "paused",
                _ => "active",
            };
            store.insert("status".to_string(), Value::String(status.to_string()));
        }
    }
}

/// 存在旧键且新键未被占用时改名；新键已存在则只丢弃旧键
fn rename_key(obj: &mut serde_json::Map<String, Value>, old: &str, new: &str) {
    if let Some(value) = obj.remove(old)
        && !obj.contains_key(new)
    {
        obj.insert(new.to_string(), value);
    }
}
