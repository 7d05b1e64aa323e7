use crate::core::Config;
use crate::db::DataStore;
use crate::services::{AiService, QrService};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 缓存和生成器不走全局单例；服务显式构造后统一装进
/// `ServerState`，由 axum 按 handler 克隆注入。
/// 全部字段都是浅拷贝 (内部 Arc)，克隆成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | store | DataStore | JSON 文档存储 |
/// | qr | QrService | QR 码生成 |
/// | ai | AiService | AI 文案生成 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// JSON 文档存储
    pub store: DataStore,
    /// QR 码生成服务
    pub qr: QrService,
    /// AI 文案服务
    pub ai: AiService,
}

impl ServerState {
    /// 初始化服务器状态
    pub fn initialize(config: &Config) -> Self {
        let store = DataStore::new(&config.data_file);
        let qr = QrService::new(&config.qr_output_dir);
        let ai = AiService::new(config.ai.clone());

        Self {
            config: config.clone(),
            store,
            qr,
            ai,
        }
    }

    /// 测试用: 指定文档路径构造状态
    pub fn for_data_file(data_file: impl Into<String>, port: u16) -> Self {
        let config = Config::with_overrides(data_file, port);
        Self::initialize(&config)
    }
}
