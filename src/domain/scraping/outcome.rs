//! 一次抓取运行的结果

use serde::Serialize;

use crate::domain::work::{ChapterResult, FailureRecord};

/// 运行结果（瞬时对象，不直接持久化）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub success_count: usize,
    pub failure_count: usize,
    pub chapters: Vec<ChapterResult>,
    pub failures: Vec<FailureRecord>,
}

impl RunOutcome {
    pub fn new(chapters: Vec<ChapterResult>, failures: Vec<FailureRecord>) -> Self {
        Self {
            success_count: chapters.len(),
            failure_count: failures.len(),
            chapters,
            failures,
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::new(self.success_count, self.failure_count)
    }
}

/// 运行状态分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// 没有请求任何章节
    Empty,
    /// 全部失败
    Failed,
    /// 部分成功
    Partial,
    /// 全部成功
    Succeeded,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Empty => "empty",
            RunStatus::Failed => "failed",
            RunStatus::Partial => "partial",
            RunStatus::Succeeded => "succeeded",
        }
    }
}

/// 面向用户的运行摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub saved: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn new(saved: usize, failed: usize) -> Self {
        Self { saved, failed }
    }

    pub fn status(&self) -> RunStatus {
        match (self.saved, self.failed) {
            (0, 0) => RunStatus::Empty,
            (0, _) => RunStatus::Failed,
            (_, 0) => RunStatus::Succeeded,
            _ => RunStatus::Partial,
        }
    }

    pub fn message(&self) -> String {
        match self.status() {
            RunStatus::Empty => "No chapters requested".to_string(),
            RunStatus::Failed => format!("{} chapters failed", self.failed),
            RunStatus::Succeeded => format!("Scraped {} chapters successfully", self.saved),
            RunStatus::Partial => format!(
                "Scraped {} chapters successfully ({} failed)",
                self.saved, self.failed
            ),
        }
    }
}
