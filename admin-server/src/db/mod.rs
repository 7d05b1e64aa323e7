//! 数据库层 — 单文件 JSON 文档存储
//!
//! 整个系统的持久化状态是一个 JSON 文档 (默认 `assets/data/data.json`)。
//! [`DataStore`] 负责：
//!
//! - **加载**: 文件缺失/损坏时回退到空文档；每次加载先跑字段迁移
//! - **保存**: 临时文件 + 独占文件锁 (有限重试) + 原子 rename
//! - **读缓存**: 进程级 5 秒 TTL，保存成功即失效
//! - **写串行化**: 完整的 load→mutate→save 周期在进程内互斥，
//!   并发管理操作不会互相丢失更新；文件锁仍保留，防御跨进程写入
//!
//! 业务操作通过 [`repository`] 中的仓库执行，每个仓库操作恰好是
//! 一次 [`DataStore::mutate`] 周期。

pub mod migrate;
pub mod models;
pub mod repository;

pub use models::Document;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::utils::{AppError, AppResult};

/// 读缓存有效期
const CACHE_TTL: Duration = Duration::from_secs(5);
/// 文件锁获取重试次数
const MAX_LOCK_RETRIES: u32 = 3;
/// 重试退避基数 (线性: base × attempt)
const LOCK_RETRY_BASE: Duration = Duration::from_millis(100);

struct CacheEntry {
    document: Document,
    loaded_at: Instant,
}

/// JSON 文档存储
#[derive(Clone)]
pub struct DataStore {
    path: PathBuf,
    cache_ttl: Duration,
    cache: Arc<StdMutex<Option<CacheEntry>>>,
    write_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl DataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache_ttl: CACHE_TTL,
            cache: Arc::new(StdMutex::new(None)),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// 自定义缓存 TTL (测试用；`Duration::ZERO` 关闭缓存)
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取文档 (带缓存)
    ///
    /// 缓存命中且未过期时不碰磁盘，最多可能读到 5 秒前的数据。
    pub async fn read(&self) -> Document {
        {
            let cache = self.cache.lock().expect("data store cache poisoned");
            if let Some(entry) = cache.as_ref()
                && entry.loaded_at.elapsed() < self.cache_ttl
            {
                return entry.document.clone();
            }
        }

        let (document, from_file) = self.load_from_disk();
        if from_file {
            let mut cache = self.cache.lock().expect("data store cache poisoned");
            *cache = Some(CacheEntry {
                document: document.clone(),
                loaded_at: Instant::now(),
            });
        }
        document
    }

    /// 执行一次串行化的 load→mutate→save 周期
    ///
    /// 进程内互斥；mutate 始终绕过读缓存，直接读权威文件。
    pub async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Document) -> AppResult<T>,
    ) -> AppResult<T> {
        let _guard = self.write_lock.lock().await;
        let (mut document, _) = self.load_from_disk();
        let out = f(&mut document)?;
        self.write_to_disk(&document).await?;
        Ok(out)
    }

    /// 整个文档替换 (POST /api/data)
    pub async fn replace(&self, document: &Document) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write_to_disk(document).await
    }

    /// 从磁盘加载；返回 (文档, 是否来自有效文件)
    ///
    /// 文件缺失或损坏都回退到空文档；损坏文件的静默丢弃是
    /// 既定行为，管理端随后的保存会重建文件。
    fn load_from_disk(&self) -> (Document, bool) {
        if !self.path.exists() {
            tracing::warn!(path = %self.path.display(), "Data file does not exist, using empty document");
            return (Document::default(), false);
        }

        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to read data file");
                return (Document::default(), false);
            }
        };

        let mut value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Data file is not valid JSON, using empty document");
                return (Document::default(), false);
            }
        };

        migrate::migrate(&mut value);

        match serde_json::from_value(value) {
            Ok(document) => (document, true),
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Data file has unexpected shape, using empty document");
                (Document::default(), false)
            }
        }
    }

    /// 落盘: 临时文件 + 独占 `<file>.lock` + 原子 rename
    ///
    /// 锁竞争时最多重试 3 次，线性退避 (100ms × 第 N 次)。
    /// 失败时原文件保持不变，锁/临时文件尽力清理。
    async fn write_to_disk(&self, document: &Document) -> AppResult<()> {
        let payload = serde_json::to_string_pretty(document)
            .map_err(|e| AppError::internal(format!("Failed to serialize document: {}", e)))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::storage(format!("Failed to create data directory: {}", e)))?;
        }

        let tmp_path = self.sibling("tmp");
        let lock_path = self.sibling("lock");
        let mut last_err: Option<std::io::Error> = None;

        for attempt in 1..=MAX_LOCK_RETRIES {
            let lock_file = File::create(&lock_path)
                .map_err(|e| AppError::storage(format!("Failed to create lock file: {}", e)))?;

            match fs2::FileExt::try_lock_exclusive(&lock_file) {
                Ok(()) => {
                    let result = fs::write(&tmp_path, payload.as_bytes())
                        .and_then(|_| fs::rename(&tmp_path, &self.path));

                    let _ = fs2::FileExt::unlock(&lock_file);
                    let _ = fs::remove_file(&lock_path);

                    return match result {
                        Ok(()) => {
                            self.invalidate_cache();
                            tracing::debug!(path = %self.path.display(), "Data file saved");
                            Ok(())
                        }
                        Err(e) => {
                            let _ = fs::remove_file(&tmp_path);
                            Err(AppError::storage(format!("Failed to write data file: {}", e)))
                        }
                    };
                }
                Err(e) => {
                    drop(lock_file);
                    last_err = Some(e);
                    if attempt < MAX_LOCK_RETRIES {
                        tracing::warn!(
                            "Data file lock is busy, retrying ({}/{})",
                            attempt,
                            MAX_LOCK_RETRIES
                        );
                        tokio::time::sleep(LOCK_RETRY_BASE * attempt).await;
                    }
                }
            }
        }

        let _ = fs::remove_file(&lock_path);
        Err(AppError::storage(format!(
            "Failed to acquire data file lock after {} attempts: {}",
            MAX_LOCK_RETRIES,
            last_err.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    fn invalidate_cache(&self) {
        let mut cache = self.cache.lock().expect("data store cache poisoned");
        *cache = None;
    }

    /// `data.json` → `data.json.<ext>`
    fn sibling(&self, ext: &str) -> PathBuf {
        let mut s = self.path.as_os_str().to_os_string();
        s.push(".");
        s.push(ext);
        PathBuf::from(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Store, StoreStatus};
    use crate::utils::time;

    fn temp_store() -> (tempfile::TempDir, DataStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DataStore::new(dir.path().join("data.json"));
        (dir, store)
    }

    fn sample_store(id: &str, order: i64) -> Store {
        Store {
            id: id.to_string(),
            name: format!("Store {}", id),
            subtitle: String::new(),
            phone: String::new(),
            address: String::new(),
            status: StoreStatus::Active,
            paused_at: None,
            order,
            created_at: time::now_iso(),
            last_modified: None,
            extra: Default::default(),
        }
    }

    #[tokio::test]
    async fn missing_file_yields_empty_document() {
        let (_dir, store) = temp_store();
        let doc = store.read().await;
        assert!(doc.stores.is_empty());
        assert!(doc.current_store_id.is_none());
        assert!(doc.activity_logs.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_yields_empty_document() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "{not json").unwrap();
        let doc = store.read().await;
        assert!(doc.stores.is_empty());
    }

    #[tokio::test]
    async fn mutate_persists_and_read_sees_it() {
        let (_dir, store) = temp_store();
        store
            .mutate(|doc| {
                doc.stores.push(sample_store("store_1", 0));
                Ok(())
            })
            .await
            .unwrap();

        let doc = store.read().await;
        assert_eq!(doc.stores.len(), 1);
        assert_eq!(doc.stores[0].id, "store_1");

        // 锁和临时文件已清理
        assert!(!store.sibling("lock").exists());
        assert!(!store.sibling("tmp").exists());
    }

    #[tokio::test]
    async fn save_of_loaded_document_is_content_noop() {
        let (_dir, store) = temp_store();
        store
            .mutate(|doc| {
                doc.stores.push(sample_store("store_1", 0));
                doc.current_store_id = Some("store_1".to_string());
                Ok(())
            })
            .await
            .unwrap();

        let before: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        let loaded = store.read().await;
        store.replace(&loaded).await.unwrap();
        let after: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn unknown_fields_survive_round_trip() {
        let (_dir, store) = temp_store();
        fs::write(
            store.path(),
            r#"{
  "stores": [{"id": "a", "name": "A", "status": "active", "subdomain": "a-shop"}],
  "currentStoreId": "a",
  "settings": {},
  "deliveryOrders": {"a": []}
}"#,
        )
        .unwrap();

        let doc = store.read().await;
        store.replace(&doc).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["stores"][0]["subdomain"], serde_json::json!("a-shop"));
        assert!(raw.get("deliveryOrders").is_some());
    }

    #[tokio::test]
    async fn read_cache_is_invalidated_by_save() {
        let (_dir, store) = temp_store();
        store
            .mutate(|doc| {
                doc.stores.push(sample_store("store_1", 0));
                Ok(())
            })
            .await
            .unwrap();

        // 预热缓存，然后绕过 DataStore 改文件 — 缓存窗口内读不到
        let _ = store.read().await;
        let mut raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        raw["stores"][0]["name"] = serde_json::json!("changed behind the cache");
        fs::write(store.path(), serde_json::to_string_pretty(&raw).unwrap()).unwrap();
        assert_eq!(store.read().await.stores[0].name, "Store store_1");

        // 保存后缓存失效，mutate 读到的是权威文件
        store
            .mutate(|doc| {
                assert_eq!(doc.stores[0].name, "changed behind the cache");
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(store.read().await.stores[0].name, "changed behind the cache");
    }

    #[tokio::test]
    async fn concurrent_mutations_lose_nothing() {
        let (_dir, store) = temp_store();

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .mutate(move |doc| {
                        doc.stores.push(sample_store(&format!("store_{}", i), i));
                        Ok(())
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let doc = store.read().await;
        assert_eq!(doc.stores.len(), 10);
    }
}
