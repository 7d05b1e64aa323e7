use crate::services::ai::AiConfig;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | PORT | 8081 | HTTP 服务端口 |
/// | DATA_FILE | assets/data/data.json | JSON 文档路径 |
/// | QR_OUTPUT_DIR | assets/images/qrcodes | QR 码输出目录 |
/// | UPLOAD_DIR | assets/images/uploads | 图片上传目录 |
/// | OPENAI_API_KEY | (未设置) | AI 文案功能的 API key |
/// | OPENAI_MODEL | gpt-4o-mini | 模型名 |
/// | OPENAI_TIMEOUT | 30 | AI 请求超时 (秒) |
/// | OPENAI_MAX_TOKENS | 1000 | 回复 token 上限 |
/// | OPENAI_TEMPERATURE | 0.7 | 采样温度 |
///
/// # 示例
///
/// ```ignore
/// PORT=8080 DATA_FILE=/data/data.json cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP 服务端口
    pub port: u16,
    /// JSON 文档路径
    pub data_file: String,
    /// QR 码输出目录
    pub qr_output_dir: String,
    /// 图片上传目录
    pub upload_dir: String,
    /// AI 文案配置
    pub ai: AiConfig,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8081),
            data_file: std::env::var("DATA_FILE")
                .unwrap_or_else(|_| "assets/data/data.json".into()),
            qr_output_dir: std::env::var("QR_OUTPUT_DIR")
                .unwrap_or_else(|_| "assets/images/qrcodes".into()),
            upload_dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "assets/images/uploads".into()),
            ai: AiConfig::from_env(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(data_file: impl Into<String>, port: u16) -> Self {
        let mut config = Self::from_env();
        config.data_file = data_file.into();
        config.port = port;
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
