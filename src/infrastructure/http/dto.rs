//! Data Transfer Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{
    ChapterSelectors, ChapterSummary, FailedChaptersResponse, ScrapeChapter, ScrapeResponse,
    ScrapeTemplate, ScrapeUrls, WorkResponse,
};
use crate::domain::work::{FailureRecord, WorkDocument};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

fn default_persist() -> bool {
    true
}

// ============================================================================
// Scrape DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ScrapeChapterRequest {
    pub work_name: String,
    pub url: String,
    pub title_selector: String,
    pub content_selector: String,
    #[serde(default = "default_persist")]
    pub persist: bool,
}

impl From<ScrapeChapterRequest> for ScrapeChapter {
    fn from(req: ScrapeChapterRequest) -> Self {
        Self {
            work_name: req.work_name,
            url: req.url,
            selectors: ChapterSelectors::new(req.title_selector, req.content_selector),
            persist: req.persist,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScrapeBatchRequest {
    pub work_name: String,
    pub url_template: String,
    pub stop_condition: String,
    pub title_selector: String,
    pub content_selector: String,
    #[serde(default)]
    pub concurrency: Option<usize>,
    #[serde(default = "default_persist")]
    pub persist: bool,
}

impl From<ScrapeBatchRequest> for ScrapeTemplate {
    fn from(req: ScrapeBatchRequest) -> Self {
        Self {
            work_name: req.work_name,
            url_template: req.url_template,
            stop_condition: req.stop_condition,
            selectors: ChapterSelectors::new(req.title_selector, req.content_selector),
            concurrency: req.concurrency,
            persist: req.persist,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScrapeUrlsRequest {
    pub work_name: String,
    pub urls: Vec<String>,
    pub title_selector: String,
    pub content_selector: String,
    #[serde(default)]
    pub concurrency: Option<usize>,
    #[serde(default = "default_persist")]
    pub persist: bool,
}

impl From<ScrapeUrlsRequest> for ScrapeUrls {
    fn from(req: ScrapeUrlsRequest) -> Self {
        Self {
            work_name: req.work_name,
            urls: req.urls,
            selectors: ChapterSelectors::new(req.title_selector, req.content_selector),
            concurrency: req.concurrency,
            persist: req.persist,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FailureRecordResponse {
    pub chapter_number: u32,
    pub url: String,
    pub error: String,
}

impl From<FailureRecord> for FailureRecordResponse {
    fn from(record: FailureRecord) -> Self {
        Self {
            chapter_number: record.chapter_number.get(),
            url: record.source_location,
            error: record.message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScrapeResultResponse {
    pub run_id: Uuid,
    pub work_name: String,
    pub status: &'static str,
    pub message: String,
    pub saved: usize,
    pub failed: usize,
    pub chapter_numbers: Vec<u32>,
    pub failed_urls: Vec<String>,
    pub failures: Vec<FailureRecordResponse>,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<WorkDocument>,
}

impl From<ScrapeResponse> for ScrapeResultResponse {
    fn from(result: ScrapeResponse) -> Self {
        Self {
            run_id: result.run_id,
            work_name: result.work_name,
            status: result.status.as_str(),
            message: result.message,
            saved: result.saved,
            failed: result.failed,
            chapter_numbers: result.chapter_numbers,
            failed_urls: result.failed_urls,
            failures: result.failures.into_iter().map(Into::into).collect(),
            persisted: result.persisted,
            document: result.document,
        }
    }
}

// ============================================================================
// Work DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GetWorkRequest {
    pub work_name: String,
}

#[derive(Debug, Deserialize)]
pub struct WorkNameQuery {
    pub work_name: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub work_name: String,
    /// `work`（默认）或 `failed`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChapterSummaryResponse {
    pub chapter_number: u32,
    pub title: String,
    pub url: String,
    pub char_count: usize,
}

impl From<ChapterSummary> for ChapterSummaryResponse {
    fn from(summary: ChapterSummary) -> Self {
        Self {
            chapter_number: summary.chapter_number,
            title: summary.title,
            url: summary.source_location,
            char_count: summary.char_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkDetailResponse {
    pub work_name: String,
    pub chapter_count: usize,
    pub chapters: Vec<ChapterSummaryResponse>,
}

impl From<WorkResponse> for WorkDetailResponse {
    fn from(work: WorkResponse) -> Self {
        Self {
            work_name: work.work_name,
            chapter_count: work.chapter_count,
            chapters: work.chapters.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FailedUrlsResponse {
    pub work_name: String,
    pub failed_urls: Vec<String>,
    pub failures: Vec<FailureRecordResponse>,
    pub updated_at: Option<String>,
}

impl From<FailedChaptersResponse> for FailedUrlsResponse {
    fn from(result: FailedChaptersResponse) -> Self {
        Self {
            work_name: result.work_name,
            failed_urls: result.failed_urls,
            failures: result.failures.into_iter().map(Into::into).collect(),
            updated_at: result.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_defaults_to_true() {
        let req: ScrapeBatchRequest = serde_json::from_str(
            r#"{
                "work_name": "Novel",
                "url_template": "https://ex.com/${counter}",
                "stop_condition": "counter < 3",
                "title_selector": "h1",
                "content_selector": ".content"
            }"#,
        )
        .unwrap();
        assert!(req.persist);
        assert_eq!(req.concurrency, None);

        let command: ScrapeTemplate = req.into();
        assert_eq!(command.selectors.title, "h1");
    }

    #[test]
    fn test_download_query_type_field() {
        let query: DownloadQuery =
            serde_json::from_str(r#"{"work_name": "Novel", "type": "failed"}"#).unwrap();
        assert_eq!(query.kind.as_deref(), Some("failed"));
    }
}
