//! 开关状态存储
//!
//! 状态以JSON文件保存：
//!
//! ```json
//! { "translationEnabled": true, "updatedAt": "2024-05-01T08:00:00Z" }
//! ```
//!
//! 文件不存在时视为未开启。

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::translation::config::TranslationConfig;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::toggle::ToggleState;

/// 持久化的开关状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub translation_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PersistedState {
    pub fn state(&self) -> ToggleState {
        ToggleState::from(self.translation_enabled)
    }
}

/// 基于文件的开关状态存储
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &TranslationConfig) -> Self {
        Self::new(config.state_file_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取状态
    pub fn load(&self) -> TranslationResult<PersistedState> {
        if !self.path.exists() {
            return Ok(PersistedState::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| {
            TranslationError::StateError(format!(
                "状态文件格式错误 {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    pub fn is_enabled(&self) -> TranslationResult<bool> {
        Ok(self.load()?.translation_enabled)
    }

    /// 写入状态
    pub fn set(&self, enabled: bool) -> TranslationResult<PersistedState> {
        let state = PersistedState {
            translation_enabled: enabled,
            updated_at: Some(Utc::now()),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&state)?;
        std::fs::write(&self.path, content)?;
        tracing::debug!("开关状态已保存: {} -> {}", self.path.display(), enabled);

        Ok(state)
    }
}
