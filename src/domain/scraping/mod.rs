//! Scraping Context - 抓取限界上下文
//!
//! 职责:
//! - 停止条件表达式（受限语法）
//! - 模板地址生成
//! - 进度估算
//! - 运行结果分类

mod condition;
mod generator;
mod outcome;
mod progress;

pub use condition::{ConditionError, StopCondition};
pub use generator::{
    generate, parse_stop_condition, GeneratorError, Location, Locations, UrlTemplate,
    COUNTER_PLACEHOLDER, MAX_ITERATIONS,
};
pub use outcome::{RunOutcome, RunStatus, RunSummary};
pub use progress::{estimate_max, percent, FALLBACK_MAX_ITERATIONS};
