//! 翻译模块
//!
//! 采用清晰的模块化架构：
//! - **config**: 配置管理
//! - **core**: 翻译服务客户端和引擎
//! - **error**: 错误处理
//! - **marks**: 翻译标记与还原
//! - **pipeline**: 文本收集与批次切分
//! - **storage**: 开关状态持久化
//! - **toggle**: 开关状态机与过程取消
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use page_translator::parsers::html_to_dom;
//! use page_translator::translation::{
//!     EngineConfig, HttpTranslator, PageSession, ToggleSignal, TranslationConfig,
//!     TranslationEngine,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TranslationConfig::default();
//! let engine = TranslationEngine::new(HttpTranslator::new(&config)?, EngineConfig::from(&config));
//!
//! let dom = html_to_dom(b"<p>Hello</p>", "utf-8")?;
//! let mut session = PageSession::new(dom, engine);
//! let outcome = session.handle_signal(ToggleSignal::new(true)).await;
//! println!("marked {} nodes", outcome.report.nodes_marked);
//! # Ok(())
//! # }
//! ```

/// 配置管理模块
///
/// 服务地址、批次大小、标记类名和状态文件路径
pub mod config;

/// 翻译服务客户端和引擎
pub mod core;

/// 错误处理模块
pub mod error;

pub mod marks;

/// 文本处理管道模块
pub mod pipeline;

pub mod storage;

pub mod toggle;

// ============================================================================
// 重新导出
// ============================================================================

pub use config::{ConfigManager, TranslationConfig};
pub use self::core::{
    BatchOutcome, EngineConfig, HttpTranslator, PassReport, TranslationEngine, Translator,
};
pub use error::{ErrorCategory, TranslationError, TranslationResult};
pub use marks::{apply_translations, restore_marks, RestorationLedger};
pub use pipeline::{BatchQueue, TextCollector, TextUnit, TranslationBatch};
pub use storage::{PersistedState, StateStore};
pub use toggle::{PageSession, PassGeneration, PassToken, ToggleOutcome, ToggleSignal, ToggleState};
