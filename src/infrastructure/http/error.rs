//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const UNPROCESSABLE: i32 = 422;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const BAD_GATEWAY: i32 = 502;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    /// 请求合法但一个章节也没有抓到
    Unprocessable(String),
    Internal(String),
    /// 目标站点请求失败
    BadGateway(String),
}

impl ApiError {
    pub fn errno(&self) -> i32 {
        match self {
            ApiError::NotFound(_) => errno::NOT_FOUND,
            ApiError::BadRequest(_) => errno::BAD_REQUEST,
            ApiError::Unprocessable(_) => errno::UNPROCESSABLE,
            ApiError::Internal(_) => errno::INTERNAL_ERROR,
            ApiError::BadGateway(_) => errno::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.errno();
        let response = match self {
            ApiError::NotFound(msg) => {
                tracing::warn!(errno = code, error = %msg, "Resource not found");
                ErrorResponse::new(code, msg)
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(errno = code, error = %msg, "Bad request");
                ErrorResponse::new(code, msg)
            }
            ApiError::Unprocessable(msg) => {
                tracing::warn!(errno = code, error = %msg, "Nothing scraped");
                ErrorResponse::new(code, msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!(errno = code, error = %msg, "Internal server error");
                ErrorResponse::new(code, msg)
            }
            ApiError::BadGateway(msg) => {
                tracing::error!(errno = code, error = %msg, "Upstream request failed");
                ErrorResponse::new(code, msg)
            }
        };

        (StatusCode::OK, Json(response)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound { resource_type, id } => {
                ApiError::NotFound(format!("{} not found: {}", resource_type, id))
            }
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::Generation(err) => ApiError::BadRequest(err.to_string()),
            ApplicationError::NothingScraped { message, .. } => ApiError::Unprocessable(message),
            ApplicationError::RepositoryError(msg) => ApiError::Internal(msg),
            ApplicationError::ExternalServiceError(msg) => ApiError::BadGateway(msg),
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}
