use thiserror::Error;

/// 服务器级错误 — 启动/绑定阶段使用，与 API 层的
/// [`AppError`](crate::utils::AppError) 区分
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
