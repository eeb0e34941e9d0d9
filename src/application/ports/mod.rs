//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod page_fetcher;
mod progress_sink;
mod selector_extractor;
mod work_repository;

pub use page_fetcher::{FetchError, PageFetcherPort};
pub use progress_sink::{ChapterProgress, ProgressSink, RunCompleted, ScrapeEvent};
pub use selector_extractor::SelectorExtractorPort;
pub use work_repository::{RepositoryError, WorkRepositoryPort};
