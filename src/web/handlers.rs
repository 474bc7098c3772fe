//! API 处理器

use std::sync::Arc;

use axum::{
    extract::{Json as ExtractJson, State},
    http::StatusCode,
    response::{Html, Json},
};
use tokio::sync::oneshot;

use crate::translation::{ToggleOutcome, ToggleSignal, TranslationError, TranslationResult};
use crate::web::types::{api_error, ApiError, AppState, StateResponse};
use crate::web::worker::PageCommand;

/// 提交开关信号
///
/// 先推进过程代数使进行中的过程停止，再把信号排入工作线程队列。
/// 两步在同一把锁内完成，工作线程的处理顺序与记录的请求状态一致。
pub async fn submit_signal(
    state: &AppState,
    signal: ToggleSignal,
) -> TranslationResult<ToggleOutcome> {
    let enabled = signal.target_state().is_enabled();
    let (reply, response) = oneshot::channel();

    {
        let _guard = state.submit_lock.lock().await;

        if state.request(enabled) {
            tracing::debug!("开关请求变更为 {}，取消进行中的过程", signal.target_state());
        }

        if let Err(e) = state.store.set(enabled) {
            tracing::warn!("保存开关状态失败: {}", e);
        }

        state
            .commands
            .send(PageCommand::Toggle { signal, reply })
            .await
            .map_err(|_| worker_gone())?;
    }

    response.await.map_err(|_| worker_gone())
}

/// POST /api/toggle
pub async fn toggle_translation(
    State(state): State<Arc<AppState>>,
    ExtractJson(signal): ExtractJson<ToggleSignal>,
) -> Result<Json<ToggleOutcome>, ApiError> {
    tracing::info!("收到开关信号: {:?}", signal);

    submit_signal(&state, signal)
        .await
        .map(Json)
        .map_err(|e| api_error(StatusCode::SERVICE_UNAVAILABLE, e))
}

/// GET /api/document
pub async fn get_document(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let (reply, response) = oneshot::channel();
    state
        .commands
        .send(PageCommand::Snapshot { reply })
        .await
        .map_err(|_| api_error(StatusCode::SERVICE_UNAVAILABLE, worker_gone()))?;

    let html = response
        .await
        .map_err(|_| api_error(StatusCode::SERVICE_UNAVAILABLE, worker_gone()))?
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;

    Ok(Html(String::from_utf8_lossy(&html).into_owned()))
}

/// GET /api/state
pub async fn get_state(State(state): State<Arc<AppState>>) -> Result<Json<StateResponse>, ApiError> {
    let (reply, response) = oneshot::channel();
    state
        .commands
        .send(PageCommand::State { reply })
        .await
        .map_err(|_| api_error(StatusCode::SERVICE_UNAVAILABLE, worker_gone()))?;

    let toggle_state = response
        .await
        .map_err(|_| api_error(StatusCode::SERVICE_UNAVAILABLE, worker_gone()))?;

    Ok(Json(StateResponse {
        translation_enabled: toggle_state.is_enabled(),
    }))
}

fn worker_gone() -> TranslationError {
    TranslationError::StateError("页面工作线程已退出".to_string())
}
