//! Extract Adapter - CSS 选择器提取实现

mod html_extractor;

pub use html_extractor::HtmlExtractor;
