//! 仓库层 — 文档上的业务操作
//!
//! 每个仓库持有 [`DataStore`](super::DataStore) 的克隆，
//! 每个写操作恰好执行一次串行化的 load→mutate→save 周期。
//! HTTP handler 只调用仓库，不直接碰文档。

pub mod activity_log;
pub mod settings;
pub mod store;
pub mod superadmin;

pub use activity_log::ActivityLogRepository;
pub use settings::SettingsRepository;
pub use store::{BulkOutcome, ReorderOutcome, StoreRepository};
pub use superadmin::SuperadminRepository;
