//! 文档数据模型
//!
//! 所有持久化实体都存放在单个 JSON 文档内 (见 [`Document`])。
//! 字段序列化统一 camelCase，与已有数据文件保持兼容。

pub mod activity_log;
pub mod document;
pub mod settings;
pub mod store;
pub mod superadmin;

pub use activity_log::{ActivityLog, NewActivityLog};
pub use document::Document;
pub use settings::{
    BasicInfo, BasicUpdate, DeliverySettings, DeliveryUpdate, DiscountSettings, DiscountUpdate,
    ImageSettings, ImagesUpdate, PickupSettings, PickupUpdate, QrCodeInfo, SettingsUpdate,
    SettingsView, StoreSettings,
};
pub use store::{Store, StoreCreate, StoreImport, StoreStatus, StoreUpdate};
pub use superadmin::{Superadmin, SuperadminUpdate};
