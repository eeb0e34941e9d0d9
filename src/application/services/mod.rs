//! Application Services - 抓取用例的组成部件
//!
//! - task_runner: 有界并发执行器
//! - chapter_fetcher: 单章节抓取
//! - orchestrator: 模板 / 地址列表运行编排
//! - reconciler: 合并与存储协调
//! - work_locks: 作品级互斥

mod chapter_fetcher;
mod orchestrator;
mod reconciler;
mod task_runner;
mod work_locks;

pub use chapter_fetcher::{ChapterFetcher, ChapterSelectors, ScrapeError, DEFAULT_FETCH_TIMEOUT};
pub use orchestrator::{RunOptions, ScrapeOrchestrator};
pub use reconciler::{Reconciled, WorkReconciler};
pub use task_runner::{TaskOutcome, TaskRunner, CANCELLED, DEFAULT_CONCURRENCY};
pub use work_locks::{WorkLockGuard, WorkLocks};
