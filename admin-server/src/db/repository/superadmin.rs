//! Superadmin repository

use crate::db::DataStore;
use crate::db::models::{Superadmin, SuperadminUpdate};
use crate::utils::{AppError, AppResult, time};

pub struct SuperadminRepository {
    store: DataStore,
}

impl SuperadminRepository {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    pub async fn info(&self) -> Option<Superadmin> {
        self.store.read().await.superadmin
    }

    /// 明文口令比对；无记录时恒为 false
    pub async fn check(&self, username: &str, password: &str) -> bool {
        match self.store.read().await.superadmin {
            Some(admin) => admin.username == username && admin.password == password,
            None => false,
        }
    }

    /// 替换账号记录；password 省略时保留旧口令，createdAt 只在首建时生成
    pub async fn update(&self, input: SuperadminUpdate) -> AppResult<Superadmin> {
        if input.username.trim().is_empty() {
            return Err(AppError::validation("username is required"));
        }
        self.store
            .mutate(move |doc| {
                let now = time::now_iso();
                let previous = doc.superadmin.take();
                let password = match input.password.filter(|p| !p.is_empty()) {
                    Some(password) => password,
                    None => previous
                        .as_ref()
                        .map(|p| p.password.clone())
                        .unwrap_or_default(),
                };
                let created_at = previous
                    .map(|p| p.created_at)
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| now.clone());

                let admin = Superadmin {
                    username: input.username,
                    password,
                    created_at,
                    last_modified: Some(now),
                };
                doc.superadmin = Some(admin.clone());
                Ok(admin)
            })
            .await
    }
}
