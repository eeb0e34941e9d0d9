//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（PageFetcher、SelectorExtractor、WorkRepository、ProgressSink）
//! - services: 有界并发执行、章节抓取、运行编排、合并协调
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod services;

// Re-exports
pub use commands::{
    handlers::{ScrapeChapterHandler, ScrapeResponse, ScrapeTemplateHandler, ScrapeUrlsHandler},
    ScrapeChapter, ScrapeTemplate, ScrapeUrls,
};

pub use error::ApplicationError;

pub use ports::{
    ChapterProgress, FetchError, PageFetcherPort, ProgressSink, RepositoryError, RunCompleted,
    ScrapeEvent, SelectorExtractorPort, WorkRepositoryPort,
};

pub use queries::{
    handlers::{
        ChapterSummary, ExportWorkHandler, ExportedFile, FailedChaptersResponse,
        GetFailedChaptersHandler, GetWorkHandler, ListWorksHandler, WorkResponse,
    },
    ExportKind, ExportWork, GetFailedChapters, GetWork, ListWorks,
};

pub use services::{
    ChapterFetcher, ChapterSelectors, RunOptions, ScrapeError, ScrapeOrchestrator, TaskRunner,
    WorkLocks, WorkReconciler,
};
