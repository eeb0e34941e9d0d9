//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::infrastructure::adapters::DEFAULT_USER_AGENT;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 抓取配置
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 抓取配置
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// 默认并发数（请求中未指定时使用）
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// 单个页面请求超时（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_concurrency() -> usize {
    5
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// 存储后端
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// 每个作品一个 JSON 文件
    #[default]
    Json,
    /// 仅内存，重启丢失
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Json => "json",
            StorageBackend::Memory => "memory",
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// JSON 文件目录
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
