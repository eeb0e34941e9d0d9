//! Work Context - 作品限界上下文
//!
//! 职责:
//! - 作品文档聚合（按章节编号有序）
//! - 新章节与已有文档的合并
//! - 失败章节记录

mod aggregate;
mod entities;
mod errors;
mod failure_log;
mod value_objects;

pub use aggregate::{MergeReport, WorkDocument};
pub use entities::{Chapter, ChapterResult, FailureRecord};
pub use errors::WorkError;
pub use failure_log::FailureLog;
pub use value_objects::{ChapterNumber, WorkName};
