//! Settings repository
//!
//! 合并策略:
//! - `basic` 直写父 Store，空字符串保留旧值
//! - `discount` / `delivery` / `pickup` / `images` 按键合并，
//!   出现的键一律生效 (包括 `enabled=false`)
//! - 其余顶层段整段替换

use crate::db::DataStore;
use crate::db::models::{QrCodeInfo, SettingsUpdate, SettingsView, Store, StoreSettings};
use crate::utils::{AppError, AppResult, time};

pub struct SettingsRepository {
    store: DataStore,
}

impl SettingsRepository {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// 读取设置；首次读取时从店铺字段播种并落盘
    pub async fn get_or_create(&self, store_id: &str) -> AppResult<SettingsView> {
        // 快路径: 设置已存在则纯读
        {
            let doc = self.store.read().await;
            let store = doc
                .store(store_id)
                .ok_or_else(|| AppError::not_found(format!("Store not found: {}", store_id)))?;
            if let Some(settings) = doc.settings.get(store_id) {
                return Ok(SettingsView::project(store, settings));
            }
        }

        let store_id = store_id.to_string();
        self.store
            .mutate(move |doc| {
                let store = doc
                    .store(&store_id)
                    .cloned()
                    .ok_or_else(|| AppError::not_found(format!("Store not found: {}", store_id)))?;
                let settings = doc
                    .settings
                    .entry(store_id.clone())
                    .or_insert_with(StoreSettings::default);
                Ok(SettingsView::project(&store, settings))
            })
            .await
    }

    /// 合并保存，返回 (投影, 变更的段名)
    pub async fn update(
        &self,
        store_id: &str,
        update: SettingsUpdate,
    ) -> AppResult<(SettingsView, Vec<String>)> {
        let store_id = store_id.to_string();
        self.store
            .mutate(move |doc| {
                let sections = update.section_names();

                let store = doc
                    .store_mut(&store_id)
                    .ok_or_else(|| AppError::not_found(format!("Store not found: {}", store_id)))?;
                if let Some(basic) = &update.basic {
                    basic.apply(store);
                    store.last_modified = Some(time::now_iso());
                }
                let store = store.clone();

                let settings = doc.settings.entry(store_id.clone()).or_default();
                if let Some(discount) = &update.discount {
                    discount.apply(&mut settings.discount);
                }
                if let Some(delivery) = &update.delivery {
                    delivery.apply(&mut settings.delivery);
                }
                if let Some(pickup) = &update.pickup {
                    pickup.apply(&mut settings.pickup);
                }
                if let Some(images) = &update.images {
                    images.apply(&mut settings.images);
                }
                for (key, value) in &update.extra {
                    // qrCode 是系统维护的段；客户端整段送来时走类型化字段，
                    // 送空对象等于清除
                    if key == "qrCode" {
                        settings.qr_code = serde_json::from_value(value.clone()).ok();
                        continue;
                    }
                    settings.extra.insert(key.clone(), value.clone());
                }

                Ok((SettingsView::project(&store, settings), sections))
            })
            .await
    }

    /// 记录上传图片的落盘路径，返回店铺 (活动日志用)
    pub async fn set_image(
        &self,
        store_id: &str,
        image_type: &str,
        path: String,
    ) -> AppResult<Store> {
        let store_id = store_id.to_string();
        let image_type = image_type.to_string();
        self.store
            .mutate(move |doc| {
                let store = doc
                    .store(&store_id)
                    .cloned()
                    .ok_or_else(|| AppError::not_found(format!("Store not found: {}", store_id)))?;
                let settings = doc.settings.entry(store_id.clone()).or_default();
                settings.images.set(&image_type, path);
                Ok(store)
            })
            .await
    }

    pub async fn set_qr_code(&self, store_id: &str, qr_code: QrCodeInfo) -> AppResult<()> {
        let store_id = store_id.to_string();
        self.store
            .mutate(move |doc| {
                if doc.store(&store_id).is_none() {
                    return Err(AppError::not_found(format!("Store not found: {}", store_id)));
                }
                let settings = doc.settings.entry(store_id.clone()).or_default();
                settings.qr_code = Some(qr_code);
                Ok(())
            })
            .await
    }

    /// 清除 QR 信息，返回旧记录 (调用方负责删文件)
    pub async fn clear_qr_code(&self, store_id: &str) -> AppResult<Option<QrCodeInfo>> {
        let store_id = store_id.to_string();
        self.store
            .mutate(move |doc| {
                if doc.store(&store_id).is_none() {
                    return Err(AppError::not_found(format!("Store not found: {}", store_id)));
                }
                Ok(doc
                    .settings
                    .get_mut(&store_id)
                    .and_then(|settings| settings.qr_code.take()))
            })
            .await
    }
}
