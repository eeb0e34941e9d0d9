//! 章节抓取器
//!
//! 一次请求 + 一次解析（标题、正文两个选择器），得到一个未编号的 ChapterResult

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::application::ports::{FetchError, PageFetcherPort, SelectorExtractorPort};
use crate::domain::work::ChapterResult;

/// 单次抓取的总时限
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// 单个章节的抓取错误（可恢复，记入失败列表）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrapeError {
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("No {field} found with selector '{selector}'")]
    Extraction {
        field: &'static str,
        selector: String,
    },
}

/// 标题 / 正文选择器
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterSelectors {
    pub title: String,
    pub content: String,
}

impl ChapterSelectors {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// 章节抓取器
#[derive(Clone)]
pub struct ChapterFetcher {
    page_fetcher: Arc<dyn PageFetcherPort>,
    extractor: Arc<dyn SelectorExtractorPort>,
    timeout: Duration,
}

impl ChapterFetcher {
    pub fn new(
        page_fetcher: Arc<dyn PageFetcherPort>,
        extractor: Arc<dyn SelectorExtractorPort>,
    ) -> Self {
        Self {
            page_fetcher,
            extractor,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 抓取单个地址，不重试
    pub async fn fetch(
        &self,
        location: &str,
        selectors: &ChapterSelectors,
    ) -> Result<ChapterResult, ScrapeError> {
        let document = tokio::time::timeout(self.timeout, self.page_fetcher.fetch(location))
            .await
            .map_err(|_| FetchError::Timeout)
            .and_then(|fetched| fetched)
            .map_err(|source| ScrapeError::Fetch {
                url: location.to_string(),
                source,
            })?;

        let mut extracted = self
            .extractor
            .extract_all(&document, &[selectors.title.as_str(), selectors.content.as_str()])
            .into_iter();
        let title = extracted
            .next()
            .flatten()
            .ok_or_else(|| ScrapeError::Extraction {
                field: "title",
                selector: selectors.title.clone(),
            })?;
        let content = extracted
            .next()
            .flatten()
            .ok_or_else(|| ScrapeError::Extraction {
                field: "content",
                selector: selectors.content.clone(),
            })?;

        ChapterResult::new(title, content, location).map_err(|_| ScrapeError::Extraction {
            field: "content",
            selector: selectors.content.clone(),
        })
    }
}
