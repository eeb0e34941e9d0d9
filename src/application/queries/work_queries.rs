//! Work Queries

/// 获取作品详情查询
#[derive(Debug, Clone)]
pub struct GetWork {
    pub work_name: String,
}

/// 列出所有作品查询
#[derive(Debug, Clone)]
pub struct ListWorks;

/// 获取失败章节查询
#[derive(Debug, Clone)]
pub struct GetFailedChapters {
    pub work_name: String,
}

/// 导出类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// 作品文档
    Work,
    /// 失败记录
    Failed,
}

impl ExportKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "work" | "novel" => Some(Self::Work),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// 导出作品 JSON 查询
#[derive(Debug, Clone)]
pub struct ExportWork {
    pub work_name: String,
    pub kind: ExportKind,
}
