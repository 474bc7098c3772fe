//! 翻译核心模块
//!
//! - `client` - 翻译服务客户端
//! - `engine` - 批次调度与DOM更新

pub mod client;
pub mod engine;

pub use client::{HttpTranslator, Translator};
pub use engine::{BatchOutcome, EngineConfig, PassReport, TranslationEngine};
