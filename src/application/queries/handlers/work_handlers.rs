//! Work Query Handlers

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::WorkRepositoryPort;
use crate::application::queries::{ExportKind, ExportWork, GetFailedChapters, GetWork, ListWorks};
use crate::domain::work::{Chapter, FailureRecord, WorkError, WorkName};
use crate::infrastructure::persistence::sanitize_key;

/// 失败记录下载文件名后缀
const FAILED_DOWNLOAD_SUFFIX: &str = "_failed";

// ============================================================================
// Response DTOs
// ============================================================================

/// 章节摘要（不含正文）
#[derive(Debug, Clone)]
pub struct ChapterSummary {
    pub chapter_number: u32,
    pub title: String,
    pub source_location: String,
    pub char_count: usize,
}

impl From<&Chapter> for ChapterSummary {
    fn from(chapter: &Chapter) -> Self {
        Self {
            chapter_number: chapter.chapter_number.get(),
            title: chapter.title.clone(),
            source_location: chapter.source_location.clone(),
            char_count: chapter.content.chars().count(),
        }
    }
}

/// 作品详情响应
#[derive(Debug, Clone)]
pub struct WorkResponse {
    pub work_name: String,
    pub chapter_count: usize,
    pub chapters: Vec<ChapterSummary>,
}

/// 失败章节响应
#[derive(Debug, Clone)]
pub struct FailedChaptersResponse {
    pub work_name: String,
    pub failed_urls: Vec<String>,
    pub failures: Vec<FailureRecord>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 导出文件
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub body: String,
}

fn parse_work_name(name: &str) -> Result<WorkName, ApplicationError> {
    WorkName::new(name).map_err(|e| WorkError::InvalidWorkName(e.to_string()).into())
}

// ============================================================================
// Handlers
// ============================================================================

/// GetWork Handler
pub struct GetWorkHandler {
    work_repo: Arc<dyn WorkRepositoryPort>,
}

impl GetWorkHandler {
    pub fn new(work_repo: Arc<dyn WorkRepositoryPort>) -> Self {
        Self { work_repo }
    }

    pub async fn handle(&self, query: GetWork) -> Result<WorkResponse, ApplicationError> {
        let work_name = parse_work_name(&query.work_name)?;
        let document = self
            .work_repo
            .find_work(&work_name)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Work", work_name.as_str()))?;

        Ok(WorkResponse {
            work_name: work_name.as_str().to_string(),
            chapter_count: document.chapter_count(),
            chapters: document.chapters().iter().map(ChapterSummary::from).collect(),
        })
    }
}

/// ListWorks Handler
pub struct ListWorksHandler {
    work_repo: Arc<dyn WorkRepositoryPort>,
}

impl ListWorksHandler {
    pub fn new(work_repo: Arc<dyn WorkRepositoryPort>) -> Self {
        Self { work_repo }
    }

    pub async fn handle(&self, _query: ListWorks) -> Result<Vec<String>, ApplicationError> {
        Ok(self.work_repo.list_works().await?)
    }
}

/// GetFailedChapters Handler
///
/// 没有失败记录时返回空列表
pub struct GetFailedChaptersHandler {
    work_repo: Arc<dyn WorkRepositoryPort>,
}

impl GetFailedChaptersHandler {
    pub fn new(work_repo: Arc<dyn WorkRepositoryPort>) -> Self {
        Self { work_repo }
    }

    pub async fn handle(
        &self,
        query: GetFailedChapters,
    ) -> Result<FailedChaptersResponse, ApplicationError> {
        let work_name = parse_work_name(&query.work_name)?;
        let log = self.work_repo.find_failures(&work_name).await?;

        Ok(match log {
            Some(log) => FailedChaptersResponse {
                work_name: work_name.as_str().to_string(),
                failed_urls: log.failed_urls(),
                failures: log.failures().to_vec(),
                updated_at: Some(log.updated_at()),
            },
            None => FailedChaptersResponse {
                work_name: work_name.as_str().to_string(),
                failed_urls: Vec::new(),
                failures: Vec::new(),
                updated_at: None,
            },
        })
    }
}

/// ExportWork Handler
pub struct ExportWorkHandler {
    work_repo: Arc<dyn WorkRepositoryPort>,
}

impl ExportWorkHandler {
    pub fn new(work_repo: Arc<dyn WorkRepositoryPort>) -> Self {
        Self { work_repo }
    }

    pub async fn handle(&self, query: ExportWork) -> Result<ExportedFile, ApplicationError> {
        let work_name = parse_work_name(&query.work_name)?;
        let key = sanitize_key(work_name.as_str());

        let (file_name, body) = match query.kind {
            ExportKind::Work => {
                let document = self
                    .work_repo
                    .find_work(&work_name)
                    .await?
                    .ok_or_else(|| ApplicationError::not_found("Work", work_name.as_str()))?;
                (format!("{}.json", key), serde_json::to_string_pretty(&document))
            }
            ExportKind::Failed => {
                let log = self
                    .work_repo
                    .find_failures(&work_name)
                    .await?
                    .ok_or_else(|| ApplicationError::not_found("Failure log", work_name.as_str()))?;
                (
                    format!("{}{}.json", key, FAILED_DOWNLOAD_SUFFIX),
                    serde_json::to_string_pretty(&log),
                )
            }
        };

        let body = body.map_err(|e| ApplicationError::internal(e.to_string()))?;
        Ok(ExportedFile { file_name, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::work::{ChapterNumber, ChapterResult, FailureLog, WorkDocument};
    use crate::infrastructure::memory::InMemoryWorkStore;

    async fn seeded() -> Arc<InMemoryWorkStore> {
        let store = Arc::new(InMemoryWorkStore::new());
        let name = WorkName::new("My Novel").unwrap();
        let (document, _) = WorkDocument::merge(
            None,
            &name,
            vec![
                ChapterResult::new("One", "First body", "https://ex.com/1").unwrap(),
                ChapterResult::new("Two", "Second", "https://ex.com/2").unwrap(),
            ],
        );
        store.save_work(&document).await.unwrap();

        let mut log = FailureLog::new(name);
        log.record([FailureRecord::new(
            ChapterNumber::new(3).unwrap(),
            "https://ex.com/3",
            "timeout",
        )]);
        store.save_failures(&log).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_get_work() {
        let handler = GetWorkHandler::new(seeded().await);
        let response = handler
            .handle(GetWork {
                work_name: "My Novel".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.chapter_count, 2);
        assert_eq!(response.chapters[1].chapter_number, 2);
        assert_eq!(response.chapters[1].title, "Two");
        assert_eq!(response.chapters[0].char_count, "First body".len());
    }

    #[tokio::test]
    async fn test_get_missing_work_is_not_found() {
        let handler = GetWorkHandler::new(Arc::new(InMemoryWorkStore::new()));
        let err = handler
            .handle(GetWork {
                work_name: "Nope".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_failed_chapters() {
        let handler = GetFailedChaptersHandler::new(seeded().await);
        let response = handler
            .handle(GetFailedChapters {
                work_name: "My Novel".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.failed_urls, vec!["https://ex.com/3".to_string()]);
        assert_eq!(response.failures[0].chapter_number.get(), 3);

        let empty = GetFailedChaptersHandler::new(Arc::new(InMemoryWorkStore::new()))
            .handle(GetFailedChapters {
                work_name: "Other".to_string(),
            })
            .await
            .unwrap();
        assert!(empty.failures.is_empty());
        assert!(empty.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_export_file_names() {
        let handler = ExportWorkHandler::new(seeded().await);

        let work = handler
            .handle(ExportWork {
                work_name: "My Novel".to_string(),
                kind: ExportKind::Work,
            })
            .await
            .unwrap();
        assert_eq!(work.file_name, "My_Novel.json");
        let parsed: WorkDocument = serde_json::from_str(&work.body).unwrap();
        assert_eq!(parsed.chapter_count(), 2);

        let failed = handler
            .handle(ExportWork {
                work_name: "My Novel".to_string(),
                kind: ExportKind::Failed,
            })
            .await
            .unwrap();
        assert_eq!(failed.file_name, "My_Novel_failed.json");
        assert!(failed.body.contains("https://ex.com/3"));
    }

    #[test]
    fn test_export_kind_parse() {
        assert_eq!(ExportKind::parse("work"), Some(ExportKind::Work));
        assert_eq!(ExportKind::parse("novel"), Some(ExportKind::Work));
        assert_eq!(ExportKind::parse("failed"), Some(ExportKind::Failed));
        assert_eq!(ExportKind::parse("other"), None);
    }
}
