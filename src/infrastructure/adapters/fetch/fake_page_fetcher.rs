//! Fake Page Fetcher - 用于测试的页面抓取客户端
//!
//! 从内存表返回固定页面，不发起网络请求

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::application::ports::{FetchError, PageFetcherPort};

/// Fake Page Fetcher
///
/// - 已注册 URL 返回对应页面
/// - 标记为失败的 URL 返回网络错误
/// - 未注册 URL 返回 HTTP 404
#[derive(Default)]
pub struct FakePageFetcher {
    pages: DashMap<String, String>,
    failing: DashMap<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakePageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册页面
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// 注册一个标准章节页面（`<h1>` 标题 + `<div class="content">` 正文）
    pub fn with_chapter(self, url: impl Into<String>, title: &str, content: &str) -> Self {
        let body = format!(
            "<html><body><h1>{}</h1><div class=\"content\">{}</div></body></html>",
            title, content
        );
        self.with_page(url, body)
    }

    /// 注册失败 URL
    pub fn with_failure(self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.failing.insert(url.into(), message.into());
        self
    }

    /// 每次请求前的模拟延迟
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 已发生的 fetch 调用次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcherPort for FakePageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(url = %url, "FakePageFetcher: returning fixed page");

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failing.get(url) {
            return Err(FetchError::NetworkError(message.clone()));
        }

        self.pages
            .get(url)
            .map(|page| page.clone())
            .ok_or_else(|| FetchError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}
