//! # Page Translator
//!
//! 网页内联翻译开关：收集页面文本节点，按批次发送到本地翻译服务，
//! 用带标记的元素替换原文，并可随时还原。
//!
//! ## 模块组织
//!
//! - `core` - 文档级处理（编码、解析、序列化）
//! - `env` - 环境变量
//! - `parsers` - HTML解析与DOM操作
//! - `translation` - 文本收集、批次调度、标记与还原、开关状态
//! - `web` - 开关信号服务器（可选）

pub mod core;
pub mod env;
pub mod parsers;
pub mod translation;
#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used items for convenience
pub use crate::core::{restore_html, translate_html, PageDocument};
pub use translation::{
    PageSession, PassReport, ToggleSignal, ToggleState, TranslationConfig, TranslationError,
    TranslationResult,
};
