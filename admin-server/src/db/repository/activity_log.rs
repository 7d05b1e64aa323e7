//! Activity log repository

use crate::db::DataStore;
use crate::db::models::{ActivityLog, NewActivityLog};
use crate::utils::AppResult;

/// 日志上限，超出丢弃最旧的
pub const MAX_ACTIVITY_LOGS: usize = 1000;

pub struct ActivityLogRepository {
    store: DataStore,
}

impl ActivityLogRepository {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// 追加一条日志 (最新的排最前)
    pub async fn record(&self, input: NewActivityLog) -> AppResult<ActivityLog> {
        let entry = input.into_entry();
        let stored = entry.clone();
        self.store
            .mutate(move |doc| {
                doc.activity_logs.insert(0, entry);
                doc.activity_logs.truncate(MAX_ACTIVITY_LOGS);
                Ok(())
            })
            .await?;
        Ok(stored)
    }

    /// 尽力记录 — 失败只打日志，绝不让主操作的响应失败
    pub async fn record_best_effort(&self, input: NewActivityLog) {
        let action = input.action.clone();
        if let Err(e) = self.record(input).await {
            tracing::warn!(action = %action, error = %e, "Failed to record activity log (ignored)");
        }
    }

    /// 分页查询，返回 (条目, 总数)
    pub async fn list(&self, page: usize, limit: usize) -> (Vec<ActivityLog>, usize) {
        let doc = self.store.read().await;
        let total = doc.activity_logs.len();
        let start = (page.saturating_sub(1)) * limit;
        let entries = doc
            .activity_logs
            .into_iter()
            .skip(start)
            .take(limit)
            .collect();
        (entries, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_repo() -> (tempfile::TempDir, ActivityLogRepository) {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join("data.json"));
        (dir, ActivityLogRepository::new(store))
    }

    #[tokio::test]
    async fn newest_entry_comes_first() {
        let (_dir, repo) = temp_repo();
        repo.record(NewActivityLog::admin("store", "first", "first entry"))
            .await
            .unwrap();
        repo.record(NewActivityLog::admin("store", "second", "second entry"))
            .await
            .unwrap();

        let (logs, total) = repo.list(1, 50).await;
        assert_eq!(total, 2);
        assert_eq!(logs[0].action, "second");
        assert_eq!(logs[1].action, "first");
    }

    #[tokio::test]
    async fn log_count_is_capped() {
        let (_dir, repo) = temp_repo();
        // 直接把文档填到上限，再追加一条
        repo.store
            .mutate(|doc| {
                for i in 0..MAX_ACTIVITY_LOGS {
                    doc.activity_logs
                        .push(NewActivityLog::admin("store", &format!("a{}", i), "").into_entry());
                }
                Ok(())
            })
            .await
            .unwrap();

        repo.record(NewActivityLog::admin("store", "overflow", ""))
            .await
            .unwrap();

        let (logs, total) = repo.list(1, 1).await;
        assert_eq!(total, MAX_ACTIVITY_LOGS);
        assert_eq!(logs[0].action, "overflow");
    }

    #[tokio::test]
    async fn pagination_slices_entries() {
        let (_dir, repo) = temp_repo();
        for i in 0..5 {
            repo.record(NewActivityLog::admin("store", &format!("a{}", i), ""))
                .await
                .unwrap();
        }
        let (page2, total) = repo.list(2, 2).await;
        assert_eq!(total, 5);
        assert_eq!(page2.len(), 2);
        // 最新在前: a4 a3 | a2 a1 | a0
        assert_eq!(page2[0].action, "a2");
        assert_eq!(page2[1].action, "a1");
    }
}
