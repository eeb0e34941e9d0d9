//! Fetch Adapter - 页面抓取实现

mod fake_page_fetcher;
mod http_page_fetcher;

pub use fake_page_fetcher::FakePageFetcher;
pub use http_page_fetcher::{HttpPageFetcher, HttpPageFetcherConfig, DEFAULT_USER_AGENT};
