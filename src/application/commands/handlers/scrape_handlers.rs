//! Scrape Command Handlers

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::application::commands::{ScrapeChapter, ScrapeTemplate, ScrapeUrls};
use crate::application::error::ApplicationError;
use crate::application::ports::{ProgressSink, RunCompleted, ScrapeEvent, WorkRepositoryPort};
use crate::application::services::{
    ChapterSelectors, Reconciled, RunOptions, ScrapeOrchestrator, WorkReconciler,
};
use crate::domain::scraping::{RunStatus, RunSummary};
use crate::domain::work::{FailureRecord, WorkDocument, WorkError, WorkName};

// ============================================================================
// Response
// ============================================================================

/// 抓取命令响应
#[derive(Debug, Clone)]
pub struct ScrapeResponse {
    pub run_id: Uuid,
    pub work_name: String,
    pub status: RunStatus,
    pub message: String,
    pub saved: usize,
    pub failed: usize,
    /// 本次写入的章节编号（升序）
    pub chapter_numbers: Vec<u32>,
    pub failures: Vec<FailureRecord>,
    pub failed_urls: Vec<String>,
    pub persisted: bool,
    /// 未持久化时返回合并后的文档，由调用方决定如何保存
    pub document: Option<WorkDocument>,
}

impl ScrapeResponse {
    fn new(run_id: Uuid, failures: Vec<FailureRecord>, reconciled: Reconciled) -> Self {
        let summary = RunSummary::new(reconciled.merge.saved(), failures.len());
        let mut chapter_numbers: Vec<u32> = reconciled.merge.numbers().map(|n| n.get()).collect();
        chapter_numbers.sort_unstable();

        Self {
            run_id,
            work_name: reconciled.document.work_name().as_str().to_string(),
            status: summary.status(),
            message: summary.message(),
            saved: summary.saved,
            failed: summary.failed,
            chapter_numbers,
            failed_urls: failures.iter().map(|f| f.source_location.clone()).collect(),
            failures,
            persisted: reconciled.persisted,
            document: if reconciled.persisted {
                None
            } else {
                Some(reconciled.document)
            },
        }
    }

    /// 没有任何章节成功时转为错误
    pub fn into_result(self) -> Result<Self, ApplicationError> {
        match self.status {
            RunStatus::Empty | RunStatus::Failed => Err(ApplicationError::NothingScraped {
                message: self.message,
                failed_urls: self.failed_urls,
            }),
            RunStatus::Partial | RunStatus::Succeeded => Ok(self),
        }
    }

    /// 运行结束事件
    pub fn completed_event(&self) -> ScrapeEvent {
        ScrapeEvent::Complete(RunCompleted {
            success_count: self.saved,
            failure_count: self.failed,
            message: self.message.clone(),
            failed_urls: self.failed_urls.clone(),
        })
    }
}

fn parse_work_name(name: &str) -> Result<WorkName, ApplicationError> {
    WorkName::new(name).map_err(|e| WorkError::InvalidWorkName(e.to_string()).into())
}

fn validate_selectors(selectors: &ChapterSelectors) -> Result<(), ApplicationError> {
    if selectors.title.trim().is_empty() {
        return Err(ApplicationError::validation("Title selector is required"));
    }
    if selectors.content.trim().is_empty() {
        return Err(ApplicationError::validation("Content selector is required"));
    }
    Ok(())
}

// ============================================================================
// ScrapeChapter
// ============================================================================

/// ScrapeChapter Handler
pub struct ScrapeChapterHandler {
    orchestrator: ScrapeOrchestrator,
    reconciler: Arc<WorkReconciler>,
}

impl ScrapeChapterHandler {
    pub fn new(orchestrator: ScrapeOrchestrator, reconciler: Arc<WorkReconciler>) -> Self {
        Self {
            orchestrator,
            reconciler,
        }
    }

    pub async fn handle(&self, command: ScrapeChapter) -> Result<ScrapeResponse, ApplicationError> {
        let work_name = parse_work_name(&command.work_name)?;
        let url = command.url.trim();
        if url.is_empty() {
            return Err(ApplicationError::validation("URL is required"));
        }
        validate_selectors(&command.selectors)?;

        let chapter = self.orchestrator.scrape_one(url, &command.selectors).await?;
        let title = chapter.title.clone();

        let reconciled = self
            .reconciler
            .reconcile(&work_name, vec![chapter], Vec::new(), command.persist)
            .await?;

        let mut response = ScrapeResponse::new(Uuid::new_v4(), Vec::new(), reconciled);
        if let Some(number) = response.chapter_numbers.first() {
            response.message = format!("Chapter {} \"{}\" saved", number, title);
        }

        tracing::info!(
            work_name = %work_name,
            url = %url,
            chapter_numbers = ?response.chapter_numbers,
            "Single chapter scraped"
        );

        Ok(response)
    }
}

// ============================================================================
// ScrapeTemplate
// ============================================================================

/// ScrapeTemplate Handler
///
/// 传入 ProgressSink 时，推送每个成功章节的进度，并以一个 `complete` 或 `error` 事件结束
pub struct ScrapeTemplateHandler {
    orchestrator: ScrapeOrchestrator,
    reconciler: Arc<WorkReconciler>,
    default_concurrency: usize,
}

impl ScrapeTemplateHandler {
    pub fn new(
        orchestrator: ScrapeOrchestrator,
        reconciler: Arc<WorkReconciler>,
        default_concurrency: usize,
    ) -> Self {
        Self {
            orchestrator,
            reconciler,
            default_concurrency,
        }
    }

    pub async fn handle(
        &self,
        command: ScrapeTemplate,
        progress: Option<&dyn ProgressSink>,
        cancel: Option<CancellationToken>,
    ) -> Result<ScrapeResponse, ApplicationError> {
        let result = self.run(command, progress, cancel).await;

        if let Some(sink) = progress {
            match &result {
                Ok(response) => sink.emit(response.completed_event()),
                Err(e) => sink.emit(ScrapeEvent::Error {
                    message: e.to_string(),
                }),
            }
        }

        result
    }

    async fn run(
        &self,
        command: ScrapeTemplate,
        progress: Option<&dyn ProgressSink>,
        cancel: Option<CancellationToken>,
    ) -> Result<ScrapeResponse, ApplicationError> {
        let work_name = parse_work_name(&command.work_name)?;
        validate_selectors(&command.selectors)?;

        let mut options = RunOptions::default()
            .with_concurrency(command.concurrency.unwrap_or(self.default_concurrency));
        if let Some(token) = cancel {
            options = options.with_cancellation(token);
        }

        tracing::info!(
            run_id = %options.run_id,
            work_name = %work_name,
            url_template = %command.url_template,
            stop_condition = %command.stop_condition,
            "Templated scrape requested"
        );

        let outcome = self
            .orchestrator
            .scrape_many(
                &command.url_template,
                &command.stop_condition,
                &command.selectors,
                &options,
                progress,
            )
            .await?;

        let failures = outcome.failures;
        let reconciled = self
            .reconciler
            .reconcile(&work_name, outcome.chapters, failures.clone(), command.persist)
            .await?;

        Ok(ScrapeResponse::new(options.run_id, failures, reconciled))
    }
}

// ============================================================================
// ScrapeUrls
// ============================================================================

/// ScrapeUrls Handler
///
/// 通过失败记录把 URL 映射回原章节编号
pub struct ScrapeUrlsHandler {
    orchestrator: ScrapeOrchestrator,
    reconciler: Arc<WorkReconciler>,
    work_repo: Arc<dyn WorkRepositoryPort>,
    default_concurrency: usize,
}

impl ScrapeUrlsHandler {
    pub fn new(
        orchestrator: ScrapeOrchestrator,
        reconciler: Arc<WorkReconciler>,
        work_repo: Arc<dyn WorkRepositoryPort>,
        default_concurrency: usize,
    ) -> Self {
        Self {
            orchestrator,
            reconciler,
            work_repo,
            default_concurrency,
        }
    }

    pub async fn handle(&self, command: ScrapeUrls) -> Result<ScrapeResponse, ApplicationError> {
        let work_name = parse_work_name(&command.work_name)?;
        validate_selectors(&command.selectors)?;

        let urls: Vec<String> = command
            .urls
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .collect();
        if urls.is_empty() {
            return Err(ApplicationError::validation("At least one URL is required"));
        }

        let known_counters = self
            .work_repo
            .find_failures(&work_name)
            .await?
            .map(|log| log.known_counters())
            .unwrap_or_default();

        let options = RunOptions::default()
            .with_concurrency(command.concurrency.unwrap_or(self.default_concurrency));

        let outcome = self
            .orchestrator
            .scrape_urls(&urls, &command.selectors, &options, &known_counters)
            .await;

        let failures = outcome.failures;
        let reconciled = self
            .reconciler
            .reconcile(&work_name, outcome.chapters, failures.clone(), command.persist)
            .await?;

        Ok(ScrapeResponse::new(options.run_id, failures, reconciled))
    }
}
