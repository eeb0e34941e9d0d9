//! Work Context - Aggregate Root

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{Chapter, ChapterNumber, ChapterResult, WorkName};

/// WorkDocument 聚合根
///
/// 不变量:
/// - 章节编号在作品内唯一
/// - 每次修改后 chapters 按编号升序排列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawWorkDocument")]
pub struct WorkDocument {
    work_name: WorkName,
    chapters: Vec<Chapter>,
}

/// 反序列化中间结构，加载后重新建立不变量
#[derive(Deserialize)]
struct RawWorkDocument {
    work_name: WorkName,
    #[serde(default)]
    chapters: Vec<Chapter>,
}

impl From<RawWorkDocument> for WorkDocument {
    fn from(raw: RawWorkDocument) -> Self {
        let mut document = WorkDocument::new(raw.work_name);
        for chapter in raw.chapters {
            document.upsert(chapter);
        }
        document.sort();
        document
    }
}

/// 一次合并的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// 新追加的章节编号
    pub appended: Vec<ChapterNumber>,
    /// 被覆盖的章节编号
    pub replaced: Vec<ChapterNumber>,
    /// 由带编号的结果写入的编号（顺序追加分配的编号不在其中）
    pub claimed: Vec<ChapterNumber>,
}

impl MergeReport {
    pub fn saved(&self) -> usize {
        self.appended.len() + self.replaced.len()
    }

    /// 本批次写入的全部编号
    pub fn numbers(&self) -> impl Iterator<Item = ChapterNumber> + '_ {
        self.appended.iter().chain(self.replaced.iter()).copied()
    }
}

impl WorkDocument {
    /// 创建空作品
    pub fn new(work_name: WorkName) -> Self {
        Self {
            work_name,
            chapters: Vec::new(),
        }
    }

    /// 把一批新抓取的章节合并进已有文档
    ///
    /// `existing` 为空时从空文档开始
    pub fn merge(
        existing: Option<WorkDocument>,
        work_name: &WorkName,
        incoming: Vec<ChapterResult>,
    ) -> (WorkDocument, MergeReport) {
        let mut document = existing.unwrap_or_else(|| WorkDocument::new(work_name.clone()));
        let report = document.merge_batch(incoming);
        (document, report)
    }

    /// 合并一批章节
    ///
    /// 规则:
    /// 1. 带编号的结果直接使用其编号
    /// 2. 无编号的结果从 `max(现有编号, 0) + 1` 起连续分配，跳过本批次显式占用的编号
    /// 3. 编号已存在则原位覆盖，否则追加
    /// 4. 最后按编号升序排序
    pub fn merge_batch(&mut self, incoming: Vec<ChapterResult>) -> MergeReport {
        let mut report = MergeReport::default();
        if incoming.is_empty() {
            return report;
        }

        let reserved: HashSet<ChapterNumber> =
            incoming.iter().filter_map(|r| r.chapter_number).collect();
        let mut next = self.next_chapter_number();

        for result in incoming {
            let number = match result.chapter_number {
                Some(number) => {
                    report.claimed.push(number);
                    number
                }
                None => {
                    while reserved.contains(&next) {
                        next = next.next();
                    }
                    let assigned = next;
                    next = next.next();
                    assigned
                }
            };

            if self.upsert(result.into_chapter(number)) {
                report.replaced.push(number);
            } else {
                report.appended.push(number);
            }
        }

        self.sort();
        report
    }

    /// 下一个顺序编号
    pub fn next_chapter_number(&self) -> ChapterNumber {
        self.chapters
            .iter()
            .map(|c| c.chapter_number)
            .max()
            .map(|n| n.next())
            .unwrap_or(ChapterNumber::FIRST)
    }

    /// 写入章节，返回是否覆盖了已有章节
    fn upsert(&mut self, chapter: Chapter) -> bool {
        match self
            .chapters
            .iter_mut()
            .find(|c| c.chapter_number == chapter.chapter_number)
        {
            Some(slot) => {
                *slot = chapter;
                true
            }
            None => {
                self.chapters.push(chapter);
                false
            }
        }
    }

    fn sort(&mut self) {
        self.chapters.sort_by_key(|c| c.chapter_number);
    }

    // Getters
    pub fn work_name(&self) -> &WorkName {
        &self.work_name
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn get_chapter(&self, number: ChapterNumber) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.chapter_number == number)
    }

    pub fn chapter_numbers(&self) -> Vec<ChapterNumber> {
        self.chapters.iter().map(|c| c.chapter_number).collect()
    }
}
