//! 抓取编排
//!
//! 组合地址生成、有界并发执行与章节抓取，产出 RunOutcome

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::chapter_fetcher::{ChapterFetcher, ChapterSelectors, ScrapeError};
use super::task_runner::{TaskRunner, DEFAULT_CONCURRENCY};
use crate::application::ports::{ChapterProgress, ProgressSink, ScrapeEvent};
use crate::domain::scraping::{generate, percent, GeneratorError, RunOutcome};
use crate::domain::work::{ChapterNumber, ChapterResult, FailureRecord};

/// 单次运行的参数
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub run_id: Uuid,
    pub concurrency: usize,
    pub cancel: Option<CancellationToken>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            concurrency: DEFAULT_CONCURRENCY,
            cancel: None,
        }
    }
}

impl RunOptions {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn runner(&self) -> TaskRunner {
        let runner = TaskRunner::new(self.concurrency);
        match &self.cancel {
            Some(token) => runner.with_cancellation(token.clone()),
            None => runner,
        }
    }
}

/// 抓取编排器
#[derive(Clone)]
pub struct ScrapeOrchestrator {
    fetcher: ChapterFetcher,
}

impl ScrapeOrchestrator {
    pub fn new(fetcher: ChapterFetcher) -> Self {
        Self { fetcher }
    }

    /// 单个地址，结果不编号
    pub async fn scrape_one(
        &self,
        location: &str,
        selectors: &ChapterSelectors,
    ) -> Result<ChapterResult, ScrapeError> {
        self.fetcher.fetch(location, selectors).await
    }

    /// 模板化多章节抓取
    ///
    /// 先完整生成地址列表（生成失败时不发起任何请求），再并发抓取。
    /// 每个成功章节以其 counter 编号，并按完成顺序推送进度。
    pub async fn scrape_many(
        &self,
        url_template: &str,
        stop_condition: &str,
        selectors: &ChapterSelectors,
        options: &RunOptions,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<RunOutcome, GeneratorError> {
        let locations = generate(url_template, stop_condition)?;
        let total = locations.len();

        tracing::info!(
            run_id = %options.run_id,
            total = total,
            concurrency = options.concurrency,
            "Scrape run started"
        );

        let completed = AtomicUsize::new(0);
        let fetcher = &self.fetcher;
        let run_id = options.run_id;

        let outcomes = options
            .runner()
            .run(
                &locations,
                |_, location| {
                    let counter = location.counter;
                    let url = location.url.clone();
                    async move {
                        let result = fetcher.fetch(&url, selectors).await;
                        log_item(run_id, counter, &url, &result);
                        result
                    }
                },
                |index, chapter| {
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(sink) = progress {
                        let location = &locations[index];
                        sink.emit(ScrapeEvent::Progress(ChapterProgress {
                            counter: location.counter,
                            title: chapter.title.clone(),
                            url: location.url.clone(),
                            percent: percent(location.counter, stop_condition),
                            completed: done,
                            total,
                        }));
                    }
                },
            )
            .await;

        let mut chapters = Vec::new();
        let mut failures = Vec::new();
        for (outcome, location) in outcomes.into_iter().zip(&locations) {
            match outcome.result {
                Ok(chapter) => chapters.push(chapter.numbered(location.chapter_number())),
                Err(message) => failures.push(FailureRecord::new(
                    location.chapter_number(),
                    location.url.clone(),
                    message,
                )),
            }
        }

        let outcome = RunOutcome::new(chapters, failures);
        tracing::info!(
            run_id = %options.run_id,
            success = outcome.success_count,
            failed = outcome.failure_count,
            "Scrape run finished"
        );
        Ok(outcome)
    }

    /// 指定地址列表抓取
    ///
    /// `known_counters` 中存在的地址（字符串完全相等）沿用原章节编号；
    /// 其余地址成功时不编号，失败时以其在列表中的位置（从 1 开始）编号。
    pub async fn scrape_urls(
        &self,
        urls: &[String],
        selectors: &ChapterSelectors,
        options: &RunOptions,
        known_counters: &HashMap<String, ChapterNumber>,
    ) -> RunOutcome {
        tracing::info!(
            run_id = %options.run_id,
            total = urls.len(),
            known = known_counters.len(),
            "Manual scrape started"
        );

        let fetcher = &self.fetcher;
        let run_id = options.run_id;

        let outcomes = options
            .runner()
            .run(
                urls,
                |index, url| {
                    let url = url.clone();
                    let counter = known_counters
                        .get(&url)
                        .map_or(index as u32 + 1, ChapterNumber::get);
                    async move {
                        let result = fetcher.fetch(&url, selectors).await;
                        log_item(run_id, counter, &url, &result);
                        result
                    }
                },
                |_, _| {},
            )
            .await;

        let mut chapters = Vec::new();
        let mut failures = Vec::new();
        for (outcome, url) in outcomes.into_iter().zip(urls) {
            let known = known_counters.get(url).copied();
            match outcome.result {
                Ok(chapter) => chapters.push(match known {
                    Some(number) => chapter.numbered(number),
                    None => chapter,
                }),
                Err(message) => {
                    let number = known.unwrap_or_else(|| position_number(outcome.index));
                    failures.push(FailureRecord::new(number, url.clone(), message));
                }
            }
        }

        let outcome = RunOutcome::new(chapters, failures);
        tracing::info!(
            run_id = %options.run_id,
            success = outcome.success_count,
            failed = outcome.failure_count,
            "Manual scrape finished"
        );
        outcome
    }
}

fn position_number(index: usize) -> ChapterNumber {
    ChapterNumber::clamped(u32::try_from(index + 1).unwrap_or(u32::MAX))
}

fn log_item(run_id: Uuid, counter: u32, url: &str, result: &Result<ChapterResult, ScrapeError>) {
    match result {
        Ok(chapter) => tracing::debug!(
            run_id = %run_id,
            counter = counter,
            url = %url,
            title = %chapter.title,
            "Chapter scraped"
        ),
        Err(e) => tracing::warn!(
            run_id = %run_id,
            counter = counter,
            url = %url,
            error = %e,
            "Chapter failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::infrastructure::adapters::{FakePageFetcher, HtmlExtractor};

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<ScrapeEvent>>,
    }

    impl ProgressSink for RecordingSink {
        fn emit(&self, event: ScrapeEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn selectors() -> ChapterSelectors {
        ChapterSelectors::new("h1", ".content")
    }

    fn orchestrator(pages: FakePageFetcher) -> (Arc<FakePageFetcher>, ScrapeOrchestrator) {
        let pages = Arc::new(pages);
        let fetcher = ChapterFetcher::new(pages.clone(), Arc::new(HtmlExtractor::new()));
        (pages, ScrapeOrchestrator::new(fetcher))
    }

    fn chapters(range: std::ops::RangeInclusive<u32>) -> FakePageFetcher {
        range.fold(FakePageFetcher::new(), |pages, n| {
            pages.with_chapter(
                format!("https://ex.com/c/{}", n),
                &format!("Chapter {}", n),
                &format!("Body {}", n),
            )
        })
    }

    #[tokio::test]
    async fn test_scrape_many_numbers_by_counter() {
        let (_, orchestrator) = orchestrator(chapters(1..=3));

        let outcome = orchestrator
            .scrape_many(
                "https://ex.com/c/${counter}",
                "counter <= 3",
                &selectors(),
                &RunOptions::default(),
                None,
            )
            .await
            .unwrap();

        assert_eq!(outcome.success_count, 3);
        assert_eq!(outcome.failure_count, 0);
        let numbers: Vec<u32> = outcome
            .chapters
            .iter()
            .map(|c| c.chapter_number.unwrap().get())
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(outcome.chapters[1].title, "Chapter 2");
    }

    #[tokio::test]
    async fn test_scrape_many_partitions_failures() {
        // 第 2 章请求失败
        let pages = chapters(1..=3).with_failure("https://ex.com/c/2", "connection reset");
        let (_, orchestrator) = orchestrator(pages);

        let outcome = orchestrator
            .scrape_many(
                "https://ex.com/c/${counter}",
                "counter < 4",
                &selectors(),
                &RunOptions::default().with_concurrency(2),
                None,
            )
            .await
            .unwrap();

        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.failure_count, 1);
        assert_eq!(outcome.failures[0].chapter_number.get(), 2);
        assert_eq!(outcome.failures[0].source_location, "https://ex.com/c/2");
        assert!(outcome.failures[0].message.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_generator_error_makes_no_requests() {
        let (pages, orchestrator) = orchestrator(chapters(1..=3));

        let err = orchestrator
            .scrape_many(
                "https://ex.com/c/${counter}",
                "counter > 0",
                &selectors(),
                &RunOptions::default(),
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, GeneratorError::IterationLimit { .. }));
        assert_eq!(pages.calls(), 0);
    }

    #[tokio::test]
    async fn test_progress_events() {
        let (_, orchestrator) = orchestrator(chapters(1..=4));
        let sink = RecordingSink::default();

        let outcome = orchestrator
            .scrape_many(
                "https://ex.com/c/${counter}",
                "counter <= 4",
                &selectors(),
                &RunOptions::default().with_concurrency(3),
                Some(&sink),
            )
            .await
            .unwrap();
        assert_eq!(outcome.success_count, 4);

        let events = sink.events.into_inner().unwrap();
        assert_eq!(events.len(), 4);

        let mut counters = Vec::new();
        for (i, event) in events.iter().enumerate() {
            match event {
                ScrapeEvent::Progress(p) => {
                    assert_eq!(p.completed, i + 1);
                    assert_eq!(p.total, 4);
                    assert_eq!(p.title, format!("Chapter {}", p.counter));
                    assert!((p.percent - 25.0 * p.counter as f64).abs() < 1e-9);
                    counters.push(p.counter);
                }
                other => panic!("unexpected event: {:?}", other),
            }
        }
        counters.sort();
        assert_eq!(counters, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_scrape_urls_recovers_known_counters() {
        let pages = FakePageFetcher::new()
            .with_chapter("https://ex.com/c/4", "Chapter 4", "Body 4")
            .with_failure("https://ex.com/c/7", "timeout")
            .with_chapter("https://ex.com/extra", "Extra", "Bonus")
            .with_failure("https://ex.com/broken", "gone");
        let (_, orchestrator) = orchestrator(pages);

        let known = HashMap::from([
            ("https://ex.com/c/4".to_string(), ChapterNumber::new(4).unwrap()),
            ("https://ex.com/c/7".to_string(), ChapterNumber::new(7).unwrap()),
        ]);
        let urls = vec![
            "https://ex.com/c/4".to_string(),
            "https://ex.com/c/7".to_string(),
            "https://ex.com/extra".to_string(),
            "https://ex.com/broken".to_string(),
        ];

        let outcome = orchestrator
            .scrape_urls(&urls, &selectors(), &RunOptions::default(), &known)
            .await;

        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.chapters[0].chapter_number.map(|n| n.get()), Some(4));
        assert_eq!(outcome.chapters[1].chapter_number, None);

        assert_eq!(outcome.failure_count, 2);
        assert_eq!(outcome.failures[0].chapter_number.get(), 7);
        // 未知地址按列表位置编号
        assert_eq!(outcome.failures[1].chapter_number.get(), 4);
    }

    #[tokio::test]
    async fn test_scrape_one_is_unnumbered() {
        let (_, orchestrator) = orchestrator(chapters(1..=1));
        let chapter = orchestrator
            .scrape_one("https://ex.com/c/1", &selectors())
            .await
            .unwrap();
        assert_eq!(chapter.title, "Chapter 1");
        assert!(chapter.chapter_number.is_none());
    }
}
