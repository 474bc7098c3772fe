//! 开关信号服务器
//!
//! 托管一个文档，通过 HTTP 接收开关信号：
//!
//! - `POST /api/toggle` - 开关信号，返回切换结果
//! - `GET /api/document` - 当前文档
//! - `GET /api/state` - 当前开关状态

pub mod config;
pub mod handlers;
pub mod routes;
pub mod types;
pub mod worker;

pub use config::WebConfig;
pub use routes::create_routes;
pub use types::AppState;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::translation::{
    PassGeneration, StateStore, ToggleSignal, TranslationConfig, TranslationError,
    TranslationResult,
};

/// 开关信号服务器
pub struct ToggleServer {
    config: WebConfig,
    translation: TranslationConfig,
}

impl ToggleServer {
    pub fn new(config: WebConfig, translation: TranslationConfig) -> Self {
        Self {
            config,
            translation,
        }
    }

    /// 启动工作线程并构造应用状态
    ///
    /// 持久化状态为开启时，立即提交一个开启信号
    pub async fn prepare(
        &self,
        document: Vec<u8>,
        encoding: Option<String>,
    ) -> TranslationResult<Arc<AppState>> {
        let generation = PassGeneration::new();
        let commands = worker::spawn_page_worker(
            document,
            encoding,
            self.translation.clone(),
            generation.clone(),
        )
        .await?;

        let store = StateStore::from_config(&self.translation);
        let app_state = Arc::new(AppState::new(commands, generation, store));

        if app_state.store.is_enabled().unwrap_or(false) {
            tracing::info!("持久化状态为开启，开始翻译");
            let state = Arc::clone(&app_state);
            tokio::spawn(async move {
                if let Err(e) = handlers::submit_signal(&state, ToggleSignal::new(true)).await {
                    tracing::warn!("初始翻译失败: {}", e);
                }
            });
        }

        Ok(app_state)
    }

    /// 启动服务器
    pub async fn start(&self, document: Vec<u8>, encoding: Option<String>) -> TranslationResult<()> {
        self.config
            .validate()
            .map_err(|e| TranslationError::ConfigError(e.to_string()))?;

        let app_state = self.prepare(document, encoding).await?;
        let app = create_router(app_state);

        let listener = tokio::net::TcpListener::bind(self.config.socket_addr())
            .await
            .map_err(|e| TranslationError::IoError(format!("Failed to bind server: {}", e)))?;

        tracing::info!(
            "Toggle server starting at http://{}",
            self.config.socket_addr()
        );

        axum::serve(listener, app)
            .await
            .map_err(|e| TranslationError::IoError(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// 创建路由器
pub fn create_router(app_state: Arc<AppState>) -> Router {
    create_routes()
        .with_state(app_state)
        .layer(CorsLayer::permissive())
}
