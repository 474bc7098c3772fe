//! Web 服务器类型定义

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};

use crate::translation::{PassGeneration, StateStore};
use crate::web::worker::PageCommand;

/// 应用状态
pub struct AppState {
    /// 页面工作线程的命令通道
    pub commands: mpsc::Sender<PageCommand>,
    /// 与页面会话共享的过程代数
    pub generation: PassGeneration,
    /// 最近一次请求的开关状态
    pub requested: AtomicBool,
    pub store: StateStore,
    /// 请求状态的变更与命令入队必须按同一顺序发生
    pub submit_lock: Mutex<()>,
}

impl AppState {
    pub fn new(
        commands: mpsc::Sender<PageCommand>,
        generation: PassGeneration,
        store: StateStore,
    ) -> Self {
        Self {
            commands,
            generation,
            requested: AtomicBool::new(false),
            store,
            submit_lock: Mutex::new(()),
        }
    }

    /// 记录新的请求状态，状态发生变化时使进行中的过程失效
    pub fn request(&self, enabled: bool) -> bool {
        let changed = self.requested.swap(enabled, Ordering::SeqCst) != enabled;
        if changed {
            self.generation.advance();
        }
        changed
    }
}

/// 开关状态响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub translation_enabled: bool,
}

/// API 错误响应
pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn api_error(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (
        status,
        Json(serde_json::json!({ "error": message.to_string() })),
    )
}
