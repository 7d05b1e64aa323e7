//! Store repository
//!
//! 店铺的增删改查、暂停/恢复、重排与批量操作。
//! pause/resume/order 各只有一个命名操作，每条路由恰好调用一次。

use crate::db::DataStore;
use crate::db::models::{Store, StoreCreate, StoreImport, StoreStatus, StoreUpdate};
use crate::utils::{AppError, AppResult, time};

pub struct StoreRepository {
    store: DataStore,
}

/// 重排结果 (活动日志用)
#[derive(Debug)]
pub struct ReorderOutcome {
    pub store: Store,
    pub old_order: i64,
    pub new_order: i64,
}

/// 批量操作结果
#[derive(Debug)]
pub struct BulkOutcome {
    pub count: usize,
    pub names: Vec<String>,
}

impl StoreRepository {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// 全部店铺，按展示顺序
    pub async fn list(&self) -> Vec<Store> {
        let mut stores = self.store.read().await.stores;
        stores.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.created_at.cmp(&b.created_at)));
        stores
    }

    pub async fn get(&self, id: &str) -> AppResult<Store> {
        self.store
            .read()
            .await
            .store(id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Store not found: {}", id)))
    }

    /// 新店铺追加到展示顺序末尾
    pub async fn create(&self, input: StoreCreate) -> AppResult<Store> {
        if input.name.trim().is_empty() {
            return Err(AppError::validation("name is required"));
        }

        let new_store = Store {
            id: time::new_entity_id("store", 10),
            name: input.name,
            subtitle: input.subtitle,
            phone: input.phone,
            address: input.address,
            status: StoreStatus::Active,
            paused_at: None,
            order: 0,
            created_at: time::now_iso(),
            last_modified: None,
            extra: Default::default(),
        };

        let created = new_store.clone();
        self.store
            .mutate(move |doc| {
                let mut store = new_store;
                store.order = doc.stores.len() as i64;
                doc.stores.push(store);
                Ok(())
            })
            .await?;
        // order 在 mutate 里才定下来，重新取一次
        self.get(&created.id).await
    }

    /// 更新出现的字段，返回 (店铺, 变更字段名)
    pub async fn update(&self, id: &str, update: StoreUpdate) -> AppResult<(Store, Vec<&'static str>)> {
        let id = id.to_string();
        self.store
            .mutate(move |doc| {
                let store = doc
                    .store_mut(&id)
                    .ok_or_else(|| AppError::not_found(format!("Store not found: {}", id)))?;
                let changed = update.apply(store);
                if !changed.is_empty() {
                    store.last_modified = Some(time::now_iso());
                }
                Ok((store.clone(), changed))
            })
            .await
    }

    /// 删除店铺；同时清掉它的设置，若为当前店铺则解除选中
    pub async fn delete(&self, id: &str) -> AppResult<Store> {
        let id = id.to_string();
        self.store
            .mutate(move |doc| {
                let index = doc
                    .stores
                    .iter()
                    .position(|s| s.id == id)
                    .ok_or_else(|| AppError::not_found(format!("Store not found: {}", id)))?;

                if doc.current_store_id.as_deref() == Some(id.as_str()) {
                    doc.current_store_id = None;
                }
                doc.settings.remove(&id);
                Ok(doc.stores.remove(index))
            })
            .await
    }

    /// 暂停: status=paused, 记录 pausedAt
    pub async fn pause(&self, id: &str) -> AppResult<Store> {
        let id = id.to_string();
        self.store
            .mutate(move |doc| {
                let store = doc
                    .store_mut(&id)
                    .ok_or_else(|| AppError::not_found(format!("Store not found: {}", id)))?;
                let now = time::now_iso();
                store.status = StoreStatus::Paused;
                store.paused_at = Some(now.clone());
                store.last_modified = Some(now);
                Ok(store.clone())
            })
            .await
    }

    /// 恢复: status=active, pausedAt 键整个消失
    pub async fn resume(&self, id: &str) -> AppResult<Store> {
        let id = id.to_string();
        self.store
            .mutate(move |doc| {
                let store = doc
                    .store_mut(&id)
                    .ok_or_else(|| AppError::not_found(format!("Store not found: {}", id)))?;
                store.status = StoreStatus::Active;
                store.paused_at = None;
                store.last_modified = Some(time::now_iso());
                Ok(store.clone())
            })
            .await
    }

    /// 重排: 稠密秩移位
    ///
    /// 先把所有店铺的 order 压缩为连续 0..N-1 (对稀疏/重复数据
    /// 给出确定行为)，再做移位: 目标下移时区间 `(old, new]` 内的
    /// 店铺 -1，上移时 `[new, old)` 内 +1，目标直接取 new。
    pub async fn reorder(&self, id: &str, requested_order: i64) -> AppResult<ReorderOutcome> {
        let id = id.to_string();
        self.store
            .mutate(move |doc| {
                let count = doc.stores.len() as i64;
                let target_index = doc
                    .stores
                    .iter()
                    .position(|s| s.id == id)
                    .ok_or_else(|| AppError::not_found(format!("Store not found: {}", id)))?;

                compact_orders(&mut doc.stores);

                let old_order = doc.stores[target_index].order;
                let new_order = requested_order.clamp(0, count - 1);

                for store in doc.stores.iter_mut() {
                    if store.id == id {
                        continue;
                    }
                    if old_order < new_order
                        && store.order > old_order
                        && store.order <= new_order
                    {
                        store.order -= 1;
                    } else if new_order < old_order
                        && store.order >= new_order
                        && store.order < old_order
                    {
                        store.order += 1;
                    }
                }

                let target = &mut doc.stores[target_index];
                target.order = new_order;
                target.last_modified = Some(time::now_iso());

                Ok(ReorderOutcome {
                    store: target.clone(),
                    old_order,
                    new_order,
                })
            })
            .await
    }

    pub async fn current(&self) -> Option<Store> {
        let doc = self.store.read().await;
        let id = doc.current_store_id.clone()?;
        doc.store(&id).cloned()
    }

    /// 切换当前店铺，返回 (之前的, 新的)
    pub async fn set_current(&self, id: &str) -> AppResult<(Option<Store>, Store)> {
        let id = id.to_string();
        self.store
            .mutate(move |doc| {
                let new_store = doc
                    .store(&id)
                    .cloned()
                    .ok_or_else(|| AppError::not_found(format!("Store not found: {}", id)))?;
                let old_store = doc
                    .current_store_id
                    .as_ref()
                    .and_then(|old| doc.store(old))
                    .cloned();
                doc.current_store_id = Some(id);
                Ok((old_store, new_store))
            })
            .await
    }

    // ========== 批量操作 — 单次 load/save 周期 ==========

    /// 批量字段修改 (name/subtitle/phone/address/status)
    pub async fn bulk_update(&self, ids: Vec<String>, update: StoreUpdate) -> AppResult<BulkOutcome> {
        self.store
            .mutate(move |doc| {
                let mut names = Vec::new();
                for id in &ids {
                    if let Some(store) = doc.store_mut(id) {
                        update.apply(store);
                        store.last_modified = Some(time::now_iso());
                        names.push(store.name.clone());
                    }
                }
                Ok(BulkOutcome {
                    count: names.len(),
                    names,
                })
            })
            .await
    }

    pub async fn bulk_delete(&self, ids: Vec<String>) -> AppResult<BulkOutcome> {
        self.store
            .mutate(move |doc| {
                let mut names = Vec::new();
                doc.stores.retain(|store| {
                    if ids.contains(&store.id) {
                        names.push(store.name.clone());
                        false
                    } else {
                        true
                    }
                });
                for id in &ids {
                    doc.settings.remove(id);
                }
                if let Some(current) = &doc.current_store_id
                    && ids.contains(current)
                {
                    doc.current_store_id = None;
                }
                Ok(BulkOutcome {
                    count: names.len(),
                    names,
                })
            })
            .await
    }

    /// 批量暂停/恢复
    pub async fn bulk_set_status(
        &self,
        ids: Vec<String>,
        status: StoreStatus,
    ) -> AppResult<BulkOutcome> {
        self.store
            .mutate(move |doc| {
                let mut names = Vec::new();
                let now = time::now_iso();
                for id in &ids {
                    if let Some(store) = doc.store_mut(id) {
                        store.status = status;
                        store.paused_at = match status {
                            StoreStatus::Paused => Some(now.clone()),
                            StoreStatus::Active => None,
                        };
                        store.last_modified = Some(now.clone());
                        names.push(store.name.clone());
                    }
                }
                Ok(BulkOutcome {
                    count: names.len(),
                    names,
                })
            })
            .await
    }

    /// 批量导入 — 缺名字的行跳过
    pub async fn bulk_import(&self, rows: Vec<StoreImport>) -> AppResult<BulkOutcome> {
        self.store
            .mutate(move |doc| {
                let mut names = Vec::new();
                for row in rows {
                    if row.name.trim().is_empty() {
                        continue;
                    }
                    let now = time::now_iso();
                    let store = Store {
                        id: time::new_entity_id("store", 10),
                        name: row.name,
                        subtitle: row.subtitle,
                        phone: row.phone,
                        address: row.address,
                        status: row.status.unwrap_or_default(),
                        paused_at: None,
                        order: doc.stores.len() as i64,
                        created_at: now.clone(),
                        last_modified: Some(now),
                        extra: Default::default(),
                    };
                    names.push(store.name.clone());
                    doc.stores.push(store);
                }
                Ok(BulkOutcome {
                    count: names.len(),
                    names,
                })
            })
            .await
    }
}

/// 把 order 压缩为连续 0..N-1 (稳定: 按 order, createdAt 排序)
fn compact_orders(stores: &mut [Store]) {
    let mut indices: Vec<usize> = (0..stores.len()).collect();
    indices.sort_by(|&a, &b| {
        stores[a]
            .order
            .cmp(&stores[b].order)
            .then_with(|| stores[a].created_at.cmp(&stores[b].created_at))
    });
    for (rank, index) in indices.into_iter().enumerate() {
        stores[index].order = rank as i64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_repo() -> (tempfile::TempDir, StoreRepository) {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join("data.json"));
        (dir, StoreRepository::new(store))
    }

    async fn seed(repo: &StoreRepository, count: usize) -> Vec<String> {
        let mut ids = Vec::new();
        for i in 0..count {
            let store = repo
                .create(StoreCreate {
                    name: format!("Store {}", i),
                    subtitle: String::new(),
                    phone: String::new(),
                    address: String::new(),
                })
                .await
                .unwrap();
            ids.push(store.id);
        }
        ids
    }

    #[tokio::test]
    async fn create_appends_to_display_order() {
        let (_dir, repo) = temp_repo();
        let ids = seed(&repo, 3).await;
        let stores = repo.list().await;
        let orders: Vec<i64> = stores.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(stores[2].id, ids[2]);
    }

    #[tokio::test]
    async fn reorder_moves_store_down_with_dense_shift() {
        let (_dir, repo) = temp_repo();
        let ids = seed(&repo, 4).await;

        // [0,1,2,3] 中把 order 0 的店移到 2
        let outcome = repo.reorder(&ids[0], 2).await.unwrap();
        assert_eq!(outcome.old_order, 0);
        assert_eq!(outcome.new_order, 2);

        let order_of = |stores: &[Store], id: &str| {
            stores.iter().find(|s| s.id == id).unwrap().order
        };
        let stores = repo.list().await;
        assert_eq!(order_of(&stores, &ids[0]), 2); // target
        assert_eq!(order_of(&stores, &ids[1]), 0); // was 1
        assert_eq!(order_of(&stores, &ids[2]), 1); // was 2
        assert_eq!(order_of(&stores, &ids[3]), 3); // untouched
    }

    #[tokio::test]
    async fn reorder_moves_store_up_with_dense_shift() {
        let (_dir, repo) = temp_repo();
        let ids = seed(&repo, 4).await;

        let outcome = repo.reorder(&ids[3], 1).await.unwrap();
        assert_eq!((outcome.old_order, outcome.new_order), (3, 1));

        let order_of = |stores: &[Store], id: &str| {
            stores.iter().find(|s| s.id == id).unwrap().order
        };
        let stores = repo.list().await;
        assert_eq!(order_of(&stores, &ids[0]), 0);
        assert_eq!(order_of(&stores, &ids[1]), 2);
        assert_eq!(order_of(&stores, &ids[2]), 3);
        assert_eq!(order_of(&stores, &ids[3]), 1);
    }

    #[tokio::test]
    async fn reorder_compacts_sparse_orders_first() {
        let (_dir, repo) = temp_repo();
        let ids = seed(&repo, 3).await;
        // 人为制造稀疏 order: 0, 10, 20
        repo.store
            .mutate(|doc| {
                doc.stores[1].order = 10;
                doc.stores[2].order = 20;
                Ok(())
            })
            .await
            .unwrap();

        repo.reorder(&ids[2], 0).await.unwrap();

        let mut orders: Vec<i64> = repo.list().await.iter().map(|s| s.order).collect();
        orders.sort();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(repo.get(&ids[2]).await.unwrap().order, 0);
    }

    #[tokio::test]
    async fn pause_and_resume_round_trip() {
        let (_dir, repo) = temp_repo();
        let ids = seed(&repo, 1).await;

        let paused = repo.pause(&ids[0]).await.unwrap();
        assert_eq!(paused.status, StoreStatus::Paused);
        assert!(paused.paused_at.is_some());

        let resumed = repo.resume(&ids[0]).await.unwrap();
        assert_eq!(resumed.status, StoreStatus::Active);
        assert!(resumed.paused_at.is_none());

        // pausedAt 键在序列化结果里彻底消失
        let json = serde_json::to_value(&resumed).unwrap();
        assert!(json.get("pausedAt").is_none());
    }

    #[tokio::test]
    async fn deleting_current_store_clears_selection_and_settings() {
        let (_dir, repo) = temp_repo();
        let ids = seed(&repo, 2).await;
        repo.set_current(&ids[0]).await.unwrap();
        repo.store
            .mutate(|doc| {
                doc.settings.insert(doc.stores[0].id.clone(), Default::default());
                Ok(())
            })
            .await
            .unwrap();

        repo.delete(&ids[0]).await.unwrap();

        let doc = repo.store.read().await;
        assert!(doc.current_store_id.is_none());
        assert!(doc.current_store_id_is_valid());
        assert!(!doc.settings.contains_key(&ids[0]));
        assert_eq!(doc.stores.len(), 1);
    }

    #[tokio::test]
    async fn deleting_other_store_keeps_selection() {
        let (_dir, repo) = temp_repo();
        let ids = seed(&repo, 2).await;
        repo.set_current(&ids[0]).await.unwrap();

        repo.delete(&ids[1]).await.unwrap();

        let doc = repo.store.read().await;
        assert_eq!(doc.current_store_id.as_deref(), Some(ids[0].as_str()));
    }

    #[tokio::test]
    async fn set_current_rejects_unknown_store() {
        let (_dir, repo) = temp_repo();
        seed(&repo, 1).await;
        let err = repo.set_current("store_missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn bulk_pause_and_delete_aggregate_counts() {
        let (_dir, repo) = temp_repo();
        let ids = seed(&repo, 3).await;

        let paused = repo
            .bulk_set_status(vec![ids[0].clone(), ids[1].clone(), "missing".into()], StoreStatus::Paused)
            .await
            .unwrap();
        assert_eq!(paused.count, 2);
        assert_eq!(paused.names.len(), 2);

        let deleted = repo
            .bulk_delete(vec![ids[0].clone(), ids[2].clone()])
            .await
            .unwrap();
        assert_eq!(deleted.count, 2);
        assert_eq!(repo.list().await.len(), 1);
    }

    #[tokio::test]
    async fn bulk_import_skips_nameless_rows() {
        let (_dir, repo) = temp_repo();
        let outcome = repo
            .bulk_import(vec![
                StoreImport {
                    name: "Imported".into(),
                    ..Default::default()
                },
                StoreImport::default(),
            ])
            .await
            .unwrap();
        assert_eq!(outcome.count, 1);
        assert_eq!(repo.list().await.len(), 1);
    }
}
