//! HTML Extractor - 基于 scraper 的 CSS 选择器提取
//!
//! 取第一个匹配元素的全部文本节点拼接结果，去除首尾空白

use scraper::{Html, Selector};

use crate::application::ports::SelectorExtractorPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl HtmlExtractor {
    fn select_text(html: &Html, selector: &str) -> Option<String> {
        let selector = match Selector::parse(selector) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::debug!(selector = %selector, error = ?e, "Invalid CSS selector");
                return None;
            }
        };

        let element = html.select(&selector).next()?;
        let text = element.text().collect::<String>();
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}

impl SelectorExtractorPort for HtmlExtractor {
    fn extract_all(&self, document: &str, selectors: &[&str]) -> Vec<Option<String>> {
        let html = Html::parse_document(document);
        selectors
            .iter()
            .map(|selector| Self::select_text(&html, selector))
            .collect()
    }
}
