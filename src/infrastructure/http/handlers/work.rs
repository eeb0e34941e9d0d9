//! Work HTTP Handlers

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::application::{ExportKind, ExportWork, GetFailedChapters, GetWork, ListWorks};
use crate::infrastructure::http::dto::{
    ApiResponse, DownloadQuery, FailedUrlsResponse, GetWorkRequest, WorkDetailResponse,
    WorkNameQuery,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 获取作品详情（章节摘要）
pub async fn get_work(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetWorkRequest>,
) -> Result<Json<ApiResponse<WorkDetailResponse>>, ApiError> {
    let query = GetWork {
        work_name: req.work_name,
    };
    let result = state.get_work_handler.handle(query).await?;
    Ok(Json(ApiResponse::success(result.into())))
}

/// 列出所有作品名
pub async fn list_works(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let works = state.list_works_handler.handle(ListWorks).await?;
    Ok(Json(ApiResponse::success(works)))
}

/// 获取作品的失败章节 URL
pub async fn failed_urls(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkNameQuery>,
) -> Result<Json<ApiResponse<FailedUrlsResponse>>, ApiError> {
    let query = GetFailedChapters {
        work_name: query.work_name,
    };
    let result = state.get_failed_chapters_handler.handle(query).await?;
    Ok(Json(ApiResponse::success(result.into())))
}

/// 下载作品或失败记录的 JSON 文件
pub async fn download(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DownloadQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = match query.kind.as_deref() {
        None => ExportKind::Work,
        Some(kind) => ExportKind::parse(kind)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown download type: {}", kind)))?,
    };

    let file = state
        .export_work_handler
        .handle(ExportWork {
            work_name: query.work_name,
            kind,
        })
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.body,
    ))
}
