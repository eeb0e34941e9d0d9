//! Work Repository Port - 出站端口
//!
//! 以作品名称为键的键值存储抽象，键的文件名安全化由具体实现负责

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::work::{FailureLog, WorkDocument, WorkName};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Work Repository Port
#[async_trait]
pub trait WorkRepositoryPort: Send + Sync {
    /// 读取作品文档
    async fn find_work(&self, work_name: &WorkName) -> Result<Option<WorkDocument>, RepositoryError>;

    /// 写入作品文档（整体覆盖）
    async fn save_work(&self, document: &WorkDocument) -> Result<(), RepositoryError>;

    /// 读取失败记录
    async fn find_failures(&self, work_name: &WorkName) -> Result<Option<FailureLog>, RepositoryError>;

    /// 写入失败记录（整体覆盖）
    async fn save_failures(&self, log: &FailureLog) -> Result<(), RepositoryError>;

    /// 列出已存储的作品名称
    async fn list_works(&self) -> Result<Vec<String>, RepositoryError>;
}
