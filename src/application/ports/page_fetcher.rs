//! Page Fetcher Port - 页面抓取抽象
//!
//! 定义 "fetch(url) -> 原始文档" 能力，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// 页面抓取错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Invalid response body: {0}")]
    InvalidBody(String),
}

/// Page Fetcher Port
///
/// 每次调用产生一次外部请求，不做重试
#[async_trait]
pub trait PageFetcherPort: Send + Sync {
    /// 获取页面原始 HTML
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
