//! Work Context - Value Objects

use serde::{Deserialize, Serialize};

/// 作品名称（作品的身份键）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkName(String);

impl WorkName {
    pub fn new(name: impl Into<String>) -> Result<Self, &'static str> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err("作品名称不能为空");
        }
        if name.chars().count() > 200 {
            return Err("作品名称长度不能超过200字符");
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 章节编号
///
/// 不变量: 编号 >= 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ChapterNumber(u32);

impl ChapterNumber {
    pub const FIRST: ChapterNumber = ChapterNumber(1);

    pub fn new(number: u32) -> Result<Self, &'static str> {
        if number == 0 {
            return Err("章节编号必须大于0");
        }
        Ok(Self(number))
    }

    /// 小于 1 的值按 1 处理
    pub fn clamped(number: u32) -> Self {
        Self(number.max(1))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// 下一个编号
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl TryFrom<u32> for ChapterNumber {
    type Error = &'static str;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChapterNumber> for u32 {
    fn from(number: ChapterNumber) -> Self {
        number.0
    }
}

impl std::fmt::Display for ChapterNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
