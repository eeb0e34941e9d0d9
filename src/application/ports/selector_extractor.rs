//! Selector Extractor Port - CSS 选择器提取抽象

/// Selector Extractor Port
///
/// 每个选择器返回第一个匹配元素的文本（已去除首尾空白），
/// 没有匹配、文本为空或选择器无法解析时为 `None`。
/// 提取是同步的 CPU 操作。
pub trait SelectorExtractorPort: Send + Sync {
    /// 对同一文档依次应用多个选择器，结果与 `selectors` 一一对应
    fn extract_all(&self, document: &str, selectors: &[&str]) -> Vec<Option<String>>;
}
