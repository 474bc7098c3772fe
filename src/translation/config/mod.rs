//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 批次处理相关
    pub const DEFAULT_BATCH_SIZE: usize = 5;
    pub const SEPARATOR: &str = "\n---SEPARATOR---\n";

    // 默认API设置
    pub const DEFAULT_API_URL: &str = "http://localhost:5000/translate";
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    // 标记元素
    pub const MARKER_TAG: &str = "span";
    pub const DEFAULT_MARKER_CLASS: &str = "hindi-translation";
    pub const ORIGINAL_ATTR: &str = "data-original";
    pub const MARK_ID_ATTR: &str = "data-translation-id";

    // 父元素为这些标签的文本不翻译
    pub const SKIP_ELEMENTS: &[&str] = &["script", "style"];

    // 开关状态
    pub const DEFAULT_STATE_FILE: &str = "~/.config/page-translator/state.json";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "page-translator.toml",
        ".page-translator.toml",
        "~/.config/page-translator/config.toml",
    ];
}
