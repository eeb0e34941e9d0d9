//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;
use std::time::Duration;

use crate::application::{
    // Services
    ChapterFetcher, ScrapeOrchestrator, WorkLocks, WorkReconciler,
    // Command handlers
    ScrapeChapterHandler, ScrapeTemplateHandler, ScrapeUrlsHandler,
    // Query handlers
    ExportWorkHandler, GetFailedChaptersHandler, GetWorkHandler, ListWorksHandler,
    // Ports
    PageFetcherPort, SelectorExtractorPort, WorkRepositoryPort,
};
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub work_repo: Arc<dyn WorkRepositoryPort>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub scrape_chapter_handler: ScrapeChapterHandler,
    pub scrape_template_handler: ScrapeTemplateHandler,
    pub scrape_urls_handler: ScrapeUrlsHandler,

    // ========== Query Handlers ==========
    pub get_work_handler: GetWorkHandler,
    pub list_works_handler: ListWorksHandler,
    pub get_failed_chapters_handler: GetFailedChaptersHandler,
    pub export_work_handler: ExportWorkHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        work_repo: Arc<dyn WorkRepositoryPort>,
        page_fetcher: Arc<dyn PageFetcherPort>,
        extractor: Arc<dyn SelectorExtractorPort>,
        event_publisher: Arc<EventPublisher>,
        fetch_timeout: Duration,
        default_concurrency: usize,
    ) -> Self {
        let fetcher = ChapterFetcher::new(page_fetcher, extractor).with_timeout(fetch_timeout);
        let orchestrator = ScrapeOrchestrator::new(fetcher);
        let reconciler = Arc::new(WorkReconciler::new(
            work_repo.clone(),
            Arc::new(WorkLocks::new()),
            event_publisher.clone(),
        ));

        Self {
            // Ports
            work_repo: work_repo.clone(),
            event_publisher,

            // Command handlers
            scrape_chapter_handler: ScrapeChapterHandler::new(
                orchestrator.clone(),
                reconciler.clone(),
            ),
            scrape_template_handler: ScrapeTemplateHandler::new(
                orchestrator.clone(),
                reconciler.clone(),
                default_concurrency,
            ),
            scrape_urls_handler: ScrapeUrlsHandler::new(
                orchestrator,
                reconciler,
                work_repo.clone(),
                default_concurrency,
            ),

            // Query handlers
            get_work_handler: GetWorkHandler::new(work_repo.clone()),
            list_works_handler: ListWorksHandler::new(work_repo.clone()),
            get_failed_chapters_handler: GetFailedChaptersHandler::new(work_repo.clone()),
            export_work_handler: ExportWorkHandler::new(work_repo),
        }
    }
}
