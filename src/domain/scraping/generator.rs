//! 多地址生成器
//!
//! 根据包含 `${counter}` 占位符的 URL 模板和停止条件，生成有界的 (counter, url) 序列

use thiserror::Error;

use super::condition::{ConditionError, StopCondition};
use crate::domain::work::ChapterNumber;

/// URL 模板中的计数器占位符
pub const COUNTER_PLACEHOLDER: &str = "${counter}";

/// counter 的硬上限
pub const MAX_ITERATIONS: u32 = 10_000;

/// 生成器错误（对整次运行是致命的）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid stop condition '{condition}': {source}")]
    Condition {
        condition: String,
        #[source]
        source: ConditionError,
    },

    #[error("Iteration limit reached ({limit}); check the stop condition")]
    IterationLimit { limit: u32 },
}

/// 一个待抓取的地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub counter: u32,
    pub url: String,
}

impl Location {
    /// counter 从 1 开始，直接作为章节编号
    pub fn chapter_number(&self) -> ChapterNumber {
        ChapterNumber::clamped(self.counter)
    }
}

/// 已校验的 URL 模板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate(String);

impl UrlTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, GeneratorError> {
        let template = template.into().trim().to_string();
        if !template.contains(COUNTER_PLACEHOLDER) {
            return Err(GeneratorError::Config(format!(
                "URL template must contain {}",
                COUNTER_PLACEHOLDER
            )));
        }
        Ok(Self(template))
    }

    /// 代入 counter（替换所有占位符）
    pub fn render(&self, counter: u32) -> String {
        self.0.replace(COUNTER_PLACEHOLDER, &counter.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 解析停止条件，空条件属于配置错误
pub fn parse_stop_condition(stop_condition: &str) -> Result<StopCondition, GeneratorError> {
    if stop_condition.trim().is_empty() {
        return Err(GeneratorError::Config(
            "Stop condition is required".to_string(),
        ));
    }
    StopCondition::parse(stop_condition).map_err(|source| GeneratorError::Condition {
        condition: stop_condition.trim().to_string(),
        source,
    })
}

/// 惰性地址迭代器
///
/// 每次产出前先对当前 counter 求值停止条件；出错后迭代结束。
/// 已产出的地址由调用方决定是否保留。
pub struct Locations {
    template: UrlTemplate,
    condition: StopCondition,
    counter: u32,
    done: bool,
}

impl Locations {
    pub fn new(template: UrlTemplate, condition: StopCondition) -> Self {
        Self {
            template,
            condition,
            counter: 1,
            done: false,
        }
    }

    fn fail(&mut self, error: GeneratorError) -> Option<Result<Location, GeneratorError>> {
        self.done = true;
        Some(Err(error))
    }
}

impl Iterator for Locations {
    type Item = Result<Location, GeneratorError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let counter = self.counter;
        match self.condition.evaluate(counter) {
            Ok(true) => {}
            Ok(false) => {
                self.done = true;
                return None;
            }
            Err(source) => {
                let condition = self.condition.as_str().to_string();
                return self.fail(GeneratorError::Condition { condition, source });
            }
        }

        if counter > MAX_ITERATIONS {
            return self.fail(GeneratorError::IterationLimit {
                limit: MAX_ITERATIONS,
            });
        }

        self.counter += 1;
        Some(Ok(Location {
            counter,
            url: self.template.render(counter),
        }))
    }
}

/// 生成完整地址列表
///
/// 任何错误都会中止生成，已生成的部分被丢弃
pub fn generate(url_template: &str, stop_condition: &str) -> Result<Vec<Location>, GeneratorError> {
    let template = UrlTemplate::new(url_template)?;
    let condition = parse_stop_condition(stop_condition)?;
    Locations::new(template, condition).collect()
}
