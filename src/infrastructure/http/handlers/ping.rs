//! Ping Handler - 健康检查

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::application::ListWorks;
use crate::infrastructure::http::state::AppState;

#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// 存储不可用时为 None
    pub works: Option<usize>,
}

/// 健康检查，顺带确认存储可读
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    let works = match state.list_works_handler.handle(ListWorks).await {
        Ok(works) => Some(works.len()),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not list works");
            None
        }
    };

    Json(PingResponse {
        status: if works.is_some() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        works,
    })
}
