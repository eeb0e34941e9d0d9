//! NovelScrape - 连载小说章节抓取服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Work Context: 作品文档、章节、失败记录
//! - Scraping Context: 停止条件、地址生成、进度估算、运行结果
//!
//! 应用层 (application/):
//! - Ports: 端口定义（PageFetcher, SelectorExtractor, WorkRepository, ProgressSink）
//! - Services: 有界并发执行、章节抓取、运行编排、合并协调
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + SSE + WebSocket
//! - Adapters: reqwest 页面抓取, scraper 选择器提取
//! - Persistence: JSON 文件存储
//! - Memory: 内存存储
//! - Events: WebSocket 事件发布, SSE 进度通道

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
