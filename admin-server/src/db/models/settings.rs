//! Per-store settings models
//!
//! 设置按店铺 ID 存放于文档的 `settings{}` 中。
//! `basic`（店名/副标题/电话/地址）不落在设置里，而是直写父 Store 的字段，
//! 读取时再投影回 [`SettingsView`]。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::store::Store;

/// 持久化的店铺设置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSettings {
    #[serde(default)]
    pub discount: DiscountSettings,
    #[serde(default)]
    pub delivery: DeliverySettings,
    #[serde(default)]
    pub pickup: PickupSettings,
    #[serde(default)]
    pub images: ImageSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<QrCodeInfo>,
    /// 其他设置段 (如 sectionOrder)，整段替换、原样保留
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Default for DiscountSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            title: "Discount event".into(),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySettings {
    /// 外卖平台名 → 链接
    #[serde(default)]
    pub app_urls: BTreeMap<String, String>,
    /// 平台展示顺序
    #[serde(default)]
    pub delivery_order: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Default for PickupSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            title: "Pickup guide".into(),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSettings {
    #[serde(default)]
    pub main_logo: String,
    #[serde(default)]
    pub menu_image: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ImageSettings {
    /// 按上传字段名写入图片路径
    pub fn set(&mut self, image_type: &str, path: String) {
        match image_type {
            "mainLogo" => self.main_logo = path,
            "menuImage" => self.menu_image = path,
            other => {
                self.extra
                    .insert(other.to_string(), serde_json::Value::String(path));
            }
        }
    }
}

/// 已生成 QR 码的落盘信息
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeInfo {
    pub url: String,
    pub filepath: String,
    pub created_at: String,
}

// ========== 投影与更新 ==========

/// GET /api/settings?storeId= 的投影：basic 来自 Store，其余来自设置
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub id: String,
    pub basic: BasicInfo,
    pub discount: DiscountSettings,
    pub delivery: DeliverySettings,
    pub pickup: PickupSettings,
    pub images: ImageSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<QrCodeInfo>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl SettingsView {
    pub fn project(store: &Store, settings: &StoreSettings) -> Self {
        Self {
            id: store.id.clone(),
            basic: BasicInfo::from_store(store),
            discount: settings.discount.clone(),
            delivery: settings.delivery.clone(),
            pickup: settings.pickup.clone(),
            images: settings.images.clone(),
            qr_code: settings.qr_code.clone(),
            created_at: store.created_at.clone(),
            updated_at: store.last_modified.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    pub store_name: String,
    pub store_subtitle: String,
    pub store_phone: String,
    pub store_address: String,
}

impl BasicInfo {
    pub fn from_store(store: &Store) -> Self {
        Self {
            store_name: store.name.clone(),
            store_subtitle: store.subtitle.clone(),
            store_phone: store.phone.clone(),
            store_address: store.address.clone(),
        }
    }
}

/// POST /api/settings?storeId= 请求体 — 按顶层键合并
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsUpdate {
    pub basic: Option<BasicUpdate>,
    pub discount: Option<DiscountUpdate>,
    pub delivery: Option<DeliveryUpdate>,
    pub pickup: Option<PickupUpdate>,
    pub images: Option<ImagesUpdate>,
    /// 其他设置段整段替换
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SettingsUpdate {
    /// 请求中出现的段名 (活动日志用)
    pub fn section_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if self.basic.is_some() {
            names.push("basic".to_string());
        }
        if self.discount.is_some() {
            names.push("discount".to_string());
        }
        if self.delivery.is_some() {
            names.push("delivery".to_string());
        }
        if self.pickup.is_some() {
            names.push("pickup".to_string());
        }
        if self.images.is_some() {
            names.push("images".to_string());
        }
        names.extend(self.extra.keys().cloned());
        names
    }
}

/// basic 段 — 空字符串保留旧值 (避免前端空表单清掉店铺信息)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicUpdate {
    pub store_name: Option<String>,
    pub store_subtitle: Option<String>,
    pub store_phone: Option<String>,
    pub store_address: Option<String>,
}

impl BasicUpdate {
    pub fn apply(&self, store: &mut Store) {
        fn write_non_empty(target: &mut String, incoming: &Option<String>) {
            if let Some(value) = incoming
                && !value.is_empty()
            {
                *target = value.clone();
            }
        }
        write_non_empty(&mut store.name, &self.store_name);
        write_non_empty(&mut store.subtitle, &self.store_subtitle);
        write_non_empty(&mut store.phone, &self.store_phone);
        write_non_empty(&mut store.address, &self.store_address);
    }
}

/// discount 段 — 出现的键一律写入，包括 enabled=false
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscountUpdate {
    pub enabled: Option<bool>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl DiscountUpdate {
    pub fn apply(&self, settings: &mut DiscountSettings) {
        if let Some(enabled) = self.enabled {
            settings.enabled = enabled;
        }
        if let Some(title) = &self.title {
            settings.title = title.clone();
        }
        if let Some(description) = &self.description {
            settings.description = description.clone();
        }
    }
}

/// delivery 段 — appUrls 按平台键合并，deliveryOrder 整体替换
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryUpdate {
    pub app_urls: Option<BTreeMap<String, String>>,
    pub delivery_order: Option<Vec<String>>,
}

impl DeliveryUpdate {
    pub fn apply(&self, settings: &mut DeliverySettings) {
        if let Some(app_urls) = &self.app_urls {
            for (app, url) in app_urls {
                settings.app_urls.insert(app.clone(), url.clone());
            }
        }
        if let Some(order) = &self.delivery_order {
            settings.delivery_order = order.clone();
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PickupUpdate {
    pub enabled: Option<bool>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl PickupUpdate {
    pub fn apply(&self, settings: &mut PickupSettings) {
        if let Some(enabled) = self.enabled {
            settings.enabled = enabled;
        }
        if let Some(title) = &self.title {
            settings.title = title.clone();
        }
        if let Some(description) = &self.description {
            settings.description = description.clone();
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImagesUpdate {
    pub main_logo: Option<String>,
    pub menu_image: Option<String>,
}

impl ImagesUpdate {
    pub fn apply(&self, settings: &mut ImageSettings) {
        if let Some(main_logo) = &self.main_logo {
            settings.main_logo = main_logo.clone();
        }
        if let Some(menu_image) = &self.menu_image {
            settings.menu_image = menu_image.clone();
        }
    }
}
