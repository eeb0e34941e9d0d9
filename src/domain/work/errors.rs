//! Work Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkError {
    #[error("作品不存在: {0}")]
    NotFound(String),

    #[error("无效的作品名称: {0}")]
    InvalidWorkName(String),

    #[error("无效的章节编号: {0}")]
    InvalidChapterNumber(String),

    #[error("无效的章节: {0}")]
    InvalidChapter(String),
}
