//! 持久化模块
//!
//! 保存翻译开关状态

pub mod state;

pub use state::{PersistedState, StateStore};
