//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::RepositoryError;
use crate::application::services::ScrapeError;
use crate::domain::scraping::GeneratorError;
use crate::domain::work::WorkError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 生成阶段失败（配置、停止条件、迭代上限），发生在任何请求之前
    #[error(transparent)]
    Generation(#[from] GeneratorError),

    /// 一次运行没有产出任何章节
    #[error("{message}")]
    NothingScraped { message: String, failed_urls: Vec<String> },

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建外部服务错误
    pub fn external(message: impl Into<String>) -> Self {
        Self::ExternalServiceError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => Self::not_found("Work", id),
            other => Self::RepositoryError(other.to_string()),
        }
    }
}

impl From<WorkError> for ApplicationError {
    fn from(err: WorkError) -> Self {
        match err {
            WorkError::NotFound(name) => Self::not_found("Work", name),
            other => Self::ValidationError(other.to_string()),
        }
    }
}

impl From<ScrapeError> for ApplicationError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::Fetch { .. } => Self::ExternalServiceError(err.to_string()),
            ScrapeError::Extraction { .. } => Self::ValidationError(err.to_string()),
        }
    }
}
