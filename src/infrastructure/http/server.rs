//! HTTP Server
//!
//! Axum HTTP 服务器启动和配置

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::request_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;
use crate::config::ServerConfig;

/// 请求体上限（URL 列表可能较长）
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// 允许任意来源跨域（前端与服务分开部署）
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers(Any)
        .max_age(Duration::from_secs(3600))
}

/// 构建带完整中间件栈的 Router
pub fn build_router(state: Arc<AppState>) -> Router {
    create_routes()
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// 启动服务器，`shutdown_signal` 完成后停止接收新连接
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.addr()).await?;
        tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

        axum::serve(listener, build_router(self.state))
            .with_graceful_shutdown(shutdown_signal)
            .await
    }
}
