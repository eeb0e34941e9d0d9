//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Work Context: 作品文档与章节合并
//! - Scraping Context: 地址生成、停止条件、进度估算

pub mod scraping;
pub mod work;
