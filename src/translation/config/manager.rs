//! 简化的配置管理器
//!
//! 加载顺序：默认值 → 配置文件 → `.env` 文件 → 环境变量。命令行参数由调用方最后覆盖。

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// 翻译服务地址
    pub api_url: String,
    /// 每个批次的文本节点数
    pub batch_size: usize,
    /// 批次内文本之间的分隔符
    pub separator: String,
    /// 标记元素的类名
    pub marker_class: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 开关状态文件路径，支持 `~`
    pub state_file: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_url: constants::DEFAULT_API_URL.to_string(),
            batch_size: constants::DEFAULT_BATCH_SIZE,
            separator: constants::SEPARATOR.to_string(),
            marker_class: constants::DEFAULT_MARKER_CLASS.to_string(),
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT.as_secs(),
            state_file: constants::DEFAULT_STATE_FILE.to_string(),
        }
    }
}

impl TranslationConfig {
    /// 创建指向指定服务地址的默认配置
    pub fn with_api_url(api_url: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            ..Self::default()
        }
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.batch_size == 0 {
            return Err(TranslationError::ConfigError("批次大小不能为0".to_string()));
        }

        if self.separator.is_empty() {
            return Err(TranslationError::ConfigError("分隔符不能为空".to_string()));
        }

        if self.marker_class.is_empty() || self.marker_class.contains(char::is_whitespace) {
            return Err(TranslationError::ConfigError(
                "标记类名必须是单个非空标识".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(TranslationError::ConfigError("请求超时必须大于0".to_string()));
        }

        let url = url::Url::parse(&self.api_url).map_err(|e| {
            TranslationError::ConfigError(format!("无效的API地址 {}: {}", self.api_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(TranslationError::ConfigError(format!(
                "API地址必须使用 http 或 https: {}",
                self.api_url
            )));
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    ///
    /// 只有显式设置的变量才会覆盖；取值无效时记录警告并保留原值
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{translation, EnvVar};

        match translation::ApiUrl::lookup() {
            Some(Ok(api_url)) => {
                self.api_url = api_url;
                tracing::info!("环境变量覆盖 API URL: {}", self.api_url);
            }
            Some(Err(e)) => tracing::warn!("{}", e),
            None => {}
        }

        match translation::BatchSize::lookup() {
            Some(Ok(batch_size)) => self.batch_size = batch_size,
            Some(Err(e)) => tracing::warn!("{}", e),
            None => {}
        }

        match translation::Timeout::lookup() {
            Some(Ok(timeout)) => self.request_timeout_secs = timeout.as_secs(),
            Some(Err(e)) => tracing::warn!("{}", e),
            None => {}
        }

        match translation::MarkerClass::lookup() {
            Some(Ok(marker_class)) => self.marker_class = marker_class,
            Some(Err(e)) => tracing::warn!("{}", e),
            None => {}
        }

        match translation::StateFile::lookup() {
            Some(Ok(state_file)) => self.state_file = state_file,
            Some(Err(e)) => tracing::warn!("{}", e),
            None => {}
        }
    }

    /// 请求超时
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 展开 `~` 后的状态文件路径
    pub fn state_file_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.state_file).as_ref())
    }
}

/// 简化的配置管理器
pub struct ConfigManager {
    config: TranslationConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 搜索配置文件并应用环境变量
    pub fn new() -> TranslationResult<Self> {
        Self::load_dotenv();

        let mut source = None;
        let mut config = TranslationConfig::default();

        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                config = Self::load_from_file(Path::new(expanded_path.as_ref()))?;
                source = Some(PathBuf::from(expanded_path.as_ref()));
                break;
            }
        }

        if source.is_none() {
            tracing::debug!("未找到配置文件，使用默认配置");
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config, source })
    }

    /// 使用指定的配置文件
    pub fn from_file(path: &Path) -> TranslationResult<Self> {
        Self::load_dotenv();

        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self {
            config,
            source: Some(path.to_path_buf()),
        })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    /// 取出配置
    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    /// 配置来源文件
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 从指定文件加载配置，`.toml` 以外的扩展名按 JSON 解析
    fn load_from_file(path: &Path) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TranslationError::ConfigError(format!("读取配置文件失败 {}: {}", path.display(), e))
        })?;

        if path.extension().map_or(false, |ext| ext == "toml") {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        } else {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::debug!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &Path) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
