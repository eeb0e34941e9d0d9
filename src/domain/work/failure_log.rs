//! Work Context - Failure Log
//!
//! 记录一个作品中抓取失败的章节，供之后按原章节编号重新提交

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{ChapterNumber, FailureRecord, WorkName};

/// 作品的失败记录集合
///
/// 不变量:
/// - 同一 URL 只保留最近一次失败
/// - failures 按章节编号升序排列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureLog {
    work_name: WorkName,
    updated_at: DateTime<Utc>,
    failures: Vec<FailureRecord>,
}

impl FailureLog {
    pub fn new(work_name: WorkName) -> Self {
        Self {
            work_name,
            updated_at: Utc::now(),
            failures: Vec::new(),
        }
    }

    /// 记录新的失败（按 URL 覆盖旧记录）
    pub fn record(&mut self, failures: impl IntoIterator<Item = FailureRecord>) {
        for failure in failures {
            match self
                .failures
                .iter_mut()
                .find(|f| f.source_location == failure.source_location)
            {
                Some(slot) => *slot = failure,
                None => self.failures.push(failure),
            }
        }
        self.failures.sort_by_key(|f| f.chapter_number);
        self.updated_at = Utc::now();
    }

    /// 移除已被成功重新抓取的编号，返回移除数量
    pub fn heal(&mut self, numbers: impl IntoIterator<Item = ChapterNumber>) -> usize {
        let healed: HashSet<ChapterNumber> = numbers.into_iter().collect();
        let before = self.failures.len();
        self.failures.retain(|f| !healed.contains(&f.chapter_number));
        let removed = before - self.failures.len();
        if removed > 0 {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// URL -> 原章节编号（按字符串完全相等匹配）
    pub fn known_counters(&self) -> HashMap<String, ChapterNumber> {
        self.failures
            .iter()
            .map(|f| (f.source_location.clone(), f.chapter_number))
            .collect()
    }

    pub fn failed_urls(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.source_location.clone()).collect()
    }

    // Getters
    pub fn work_name(&self) -> &WorkName {
        &self.work_name
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}
