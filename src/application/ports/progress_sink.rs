//! Progress Sink Port - 运行进度推送
//!
//! 多章节运行期间向调用方推送事件：每个成功章节一个 `Progress`，
//! 结束时一个 `Complete`，生成阶段失败时一个 `Error`。

use serde::Serialize;

/// 单个章节完成的进度
///
/// 按完成顺序推送，counter 不保证单调；`completed` / `total` 单调递增，可用于进度条。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterProgress {
    pub counter: u32,
    pub title: String,
    pub url: String,
    pub percent: f64,
    pub completed: usize,
    pub total: usize,
}

/// 运行结束摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunCompleted {
    pub success_count: usize,
    pub failure_count: usize,
    pub message: String,
    pub failed_urls: Vec<String>,
}

/// 进度事件
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ScrapeEvent {
    Progress(ChapterProgress),
    Complete(RunCompleted),
    Error { message: String },
}

impl ScrapeEvent {
    /// 事件名（SSE `event:` 字段）
    pub fn name(&self) -> &'static str {
        match self {
            ScrapeEvent::Progress(_) => "progress",
            ScrapeEvent::Complete(_) => "complete",
            ScrapeEvent::Error { .. } => "error",
        }
    }
}

/// Progress Sink Port
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ScrapeEvent);
}
