//! HTTP Page Fetcher - 通过 HTTP GET 获取章节页面
//!
//! 实现 PageFetcherPort trait，使用桌面浏览器 User-Agent，非 2xx 视为失败

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::application::ports::{FetchError, PageFetcherPort};

/// 默认 User-Agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP 抓取客户端配置
#[derive(Debug, Clone)]
pub struct HttpPageFetcherConfig {
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpPageFetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpPageFetcherConfig {
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP 页面抓取客户端
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(config: HttpPageFetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        Ok(Self { client })
    }

    pub fn with_default_config() -> Result<Self, FetchError> {
        Self::new(HttpPageFetcherConfig::default())
    }
}

#[async_trait]
impl PageFetcherPort for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url = %url, "Fetching page");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else if e.is_connect() {
                FetchError::NetworkError(format!("Cannot connect to {}: {}", url, e))
            } else {
                FetchError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::InvalidBody(e.to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpPageFetcherConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_config_builder() {
        let config = HttpPageFetcherConfig::default()
            .with_timeout(5)
            .with_user_agent("novelscrape-test");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.user_agent, "novelscrape-test");
        assert!(HttpPageFetcher::new(config).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let fetcher = HttpPageFetcher::new(HttpPageFetcherConfig::default().with_timeout(2)).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:1/chapter").await.unwrap_err();
        assert!(matches!(err, FetchError::NetworkError(_) | FetchError::Timeout));
    }
}
