//! Scrape HTTP Handlers

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::stream::{self, Stream};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::application::{ScrapeEvent, ScrapeTemplate};
use crate::infrastructure::events::ChannelProgressSink;
use crate::infrastructure::http::dto::{
    ApiResponse, ScrapeBatchRequest, ScrapeChapterRequest, ScrapeResultResponse, ScrapeUrlsRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 抓取单个章节并追加到作品
pub async fn scrape_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScrapeChapterRequest>,
) -> Result<Json<ApiResponse<ScrapeResultResponse>>, ApiError> {
    let result = state.scrape_chapter_handler.handle(req.into()).await?;
    Ok(Json(ApiResponse::success(result.into())))
}

/// 按 URL 模板批量抓取，等待整次运行结束后返回
pub async fn scrape_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScrapeBatchRequest>,
) -> Result<Json<ApiResponse<ScrapeResultResponse>>, ApiError> {
    let result = state
        .scrape_template_handler
        .handle(req.into(), None, None)
        .await?
        .into_result()?;
    Ok(Json(ApiResponse::success(result.into())))
}

/// 抓取指定 URL 列表（通常用于重试失败章节）
pub async fn scrape_urls(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScrapeUrlsRequest>,
) -> Result<Json<ApiResponse<ScrapeResultResponse>>, ApiError> {
    let result = state
        .scrape_urls_handler
        .handle(req.into())
        .await?
        .into_result()?;
    Ok(Json(ApiResponse::success(result.into())))
}

/// 按 URL 模板批量抓取，以 SSE 推送进度
///
/// 事件：`progress`（每个成功章节）、`complete`（正常结束）、`error`（致命错误）。
/// 客户端断开后停止领取新章节。
pub async fn scrape_stream(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScrapeBatchRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (sink, rx) = ChannelProgressSink::channel();
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    let command: ScrapeTemplate = req.into();
    tokio::spawn(async move {
        if let Err(e) = state
            .scrape_template_handler
            .handle(command, Some(&sink), Some(cancel))
            .await
        {
            tracing::warn!(error = %e, "Streamed scrape ended with error");
        }
    });

    // guard 随流一起释放：客户端断开即取消运行
    let stream = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        let event = rx.recv().await?;
        Some((Ok(to_sse_event(&event)), (rx, guard)))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn to_sse_event(event: &ScrapeEvent) -> Event {
    let data = match serde_json::to_value(event) {
        Ok(mut value) => value
            .get_mut("data")
            .map(serde_json::Value::take)
            .unwrap_or_default(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize scrape event");
            serde_json::Value::Null
        }
    };
    Event::default().event(event.name()).data(data.to_string())
}
