//! Work Context - Entities

use serde::{Deserialize, Serialize};

use super::ChapterNumber;

/// 已存储的章节
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// 章节编号（在作品内唯一）
    pub chapter_number: ChapterNumber,
    /// 章节标题
    pub title: String,
    /// 来源地址
    pub source_location: String,
    /// 正文
    pub content: String,
}

/// 单次抓取结果
///
/// 不变量:
/// - title 和 content 不可为空
/// - chapter_number 由模板抓取的 counter 填入；手动 URL 抓取时可能为空，合并时再分配
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterResult {
    pub title: String,
    pub content: String,
    pub source_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_number: Option<ChapterNumber>,
}

impl ChapterResult {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        source_location: impl Into<String>,
    ) -> Result<Self, &'static str> {
        let title = title.into();
        let content = content.into();
        if title.is_empty() {
            return Err("章节标题不能为空");
        }
        if content.is_empty() {
            return Err("章节内容不能为空");
        }
        Ok(Self {
            title,
            content,
            source_location: source_location.into(),
            chapter_number: None,
        })
    }

    /// 绑定章节编号
    pub fn numbered(mut self, number: ChapterNumber) -> Self {
        self.chapter_number = Some(number);
        self
    }

    pub(crate) fn into_chapter(self, chapter_number: ChapterNumber) -> Chapter {
        Chapter {
            chapter_number,
            title: self.title,
            source_location: self.source_location,
            content: self.content,
        }
    }
}

/// 抓取失败记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub chapter_number: ChapterNumber,
    pub source_location: String,
    pub message: String,
}

impl FailureRecord {
    pub fn new(
        chapter_number: ChapterNumber,
        source_location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            chapter_number,
            source_location: source_location.into(),
            message: message.into(),
        }
    }
}
