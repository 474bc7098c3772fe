//! Web 路由定义

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::web::{handlers::*, types::AppState};

/// 创建路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/toggle", post(toggle_translation))
        .route("/api/document", get(get_document))
        .route("/api/state", get(get_state))
}
