//! Scrape Commands

use crate::application::services::ChapterSelectors;

/// 抓取单个章节，作为下一个顺序章节追加
#[derive(Debug, Clone)]
pub struct ScrapeChapter {
    pub work_name: String,
    pub url: String,
    pub selectors: ChapterSelectors,
    pub persist: bool,
}

/// 按 URL 模板 + 停止条件批量抓取
#[derive(Debug, Clone)]
pub struct ScrapeTemplate {
    pub work_name: String,
    pub url_template: String,
    pub stop_condition: String,
    pub selectors: ChapterSelectors,
    /// 为空时使用配置中的并发数
    pub concurrency: Option<usize>,
    pub persist: bool,
}

/// 抓取指定 URL 列表（通常是之前失败的章节）
#[derive(Debug, Clone)]
pub struct ScrapeUrls {
    pub work_name: String,
    pub urls: Vec<String>,
    pub selectors: ChapterSelectors,
    pub concurrency: Option<usize>,
    pub persist: bool,
}
