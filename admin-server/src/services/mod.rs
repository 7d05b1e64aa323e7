//! 服务模块 — 外围能力的服务对象
//!
//! 不用全局单例；服务显式构造后装进
//! [`ServerState`](crate::core::ServerState)，由 handler 注入使用。
//!
//! - [`QrService`] - QR 码生成 (可选 logo 合成)
//! - [`AiService`] - AI 文案生成 (OpenAI 兼容接口，尽力而为)

pub mod ai;
pub mod qr;

pub use ai::{AiConfig, AiContent, AiExample, AiGenerateRequest, AiService};
pub use qr::{QrOutcome, QrService};
