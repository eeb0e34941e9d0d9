//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                 GET   健康检查
//! - /api/scrape/chapter       POST  抓取单个章节
//! - /api/scrape/batch         POST  按 URL 模板批量抓取
//! - /api/scrape/stream        POST  按 URL 模板批量抓取（SSE 进度）
//! - /api/scrape/urls          POST  抓取指定 URL 列表（重试失败章节）
//! - /api/work/get             POST  获取作品详情
//! - /api/work/list            GET   列出所有作品
//! - /api/work/failed-urls     GET   获取失败章节 URL
//! - /api/work/download        GET   下载作品 / 失败记录 JSON
//! - /ws/events                WS    全局 WebSocket（作品事件）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/events", get(handlers::global_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/scrape", scrape_routes())
        .nest("/work", work_routes())
}

/// Scrape 路由
fn scrape_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chapter", post(handlers::scrape_chapter))
        .route("/batch", post(handlers::scrape_batch))
        .route("/stream", post(handlers::scrape_stream))
        .route("/urls", post(handlers::scrape_urls))
}

/// Work 路由
fn work_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/get", post(handlers::get_work))
        .route("/list", get(handlers::list_works))
        .route("/failed-urls", get(handlers::failed_urls))
        .route("/download", get(handlers::download))
}
