//! 翻译模块统一错误处理
//!
//! 批次级错误（传输、响应状态、响应格式）在批次边界被吸收并回退为原文；
//! 其余错误（配置、解析、IO、状态存储）通过 `?` 向调用方传播。

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// 网络/连接失败
    #[error("传输错误: {0}")]
    TransportError(String),

    /// 翻译服务返回非 2xx 状态
    #[error("翻译服务返回错误状态: {status}")]
    ResponseError { status: u16 },

    /// 响应缺少 `translatedText` 或不是合法 JSON
    #[error("响应格式错误: {0}")]
    FormatError(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// IO 错误
    #[error("IO错误: {0}")]
    IoError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 开关状态存储错误
    #[error("状态存储错误: {0}")]
    StateError(String),
}

pub type TranslationResult<T> = Result<T, TranslationError>;

impl TranslationError {
    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::TransportError(_) => ErrorCategory::Transport,
            TranslationError::ResponseError { .. } => ErrorCategory::Response,
            TranslationError::FormatError(_) => ErrorCategory::Format,
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::ParseError(_) => ErrorCategory::Parsing,
            TranslationError::IoError(_) => ErrorCategory::Io,
            TranslationError::SerializationError(_) => ErrorCategory::Serialization,
            TranslationError::StateError(_) => ErrorCategory::State,
        }
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Transport,
    Response,
    Format,
    Configuration,
    Parsing,
    Io,
    Serialization,
    State,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCategory::Transport => "transport",
            ErrorCategory::Response => "response",
            ErrorCategory::Format => "format",
            ErrorCategory::Configuration => "config",
            ErrorCategory::Parsing => "parse",
            ErrorCategory::Io => "io",
            ErrorCategory::Serialization => "serialization",
            ErrorCategory::State => "state",
        };
        f.write_str(name)
    }
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::SerializationError(format!("JSON序列化错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ParseError(format!("TOML解析错误: {}", error))
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            TranslationError::ResponseError {
                status: status.as_u16(),
            }
        } else if error.is_decode() {
            TranslationError::FormatError(error.to_string())
        } else {
            TranslationError::TransportError(error.to_string())
        }
    }
}

impl From<crate::env::EnvError> for TranslationError {
    fn from(error: crate::env::EnvError) -> Self {
        TranslationError::ConfigError(error.to_string())
    }
}
