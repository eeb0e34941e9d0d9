//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, StorageBackend};
use crate::infrastructure::adapters::DEFAULT_USER_AGENT;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "NOVELSCRAPE";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `NOVELSCRAPE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `NOVELSCRAPE_SERVER__PORT=8080`
/// - `NOVELSCRAPE_SCRAPER__CONCURRENCY=10`
/// - `NOVELSCRAPE_STORAGE__BACKEND=memory`
/// - `NOVELSCRAPE_STORAGE__DATA_DIR=/var/lib/novelscrape`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5070)?
        .set_default("scraper.concurrency", 5)?
        .set_default("scraper.timeout_secs", 30)?
        .set_default("scraper.user_agent", DEFAULT_USER_AGENT)?
        .set_default("storage.backend", "json")?
        .set_default("storage.data_dir", "data")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: NOVELSCRAPE_SCRAPER__TIMEOUT_SECS=60
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.scraper.concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "Scraper concurrency must be at least 1".to_string(),
        ));
    }

    if config.scraper.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Scraper timeout must be at least 1 second".to_string(),
        ));
    }

    if config.storage.backend == StorageBackend::Json
        && config.storage.data_dir.as_os_str().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "Data directory cannot be empty for the json backend".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Scraper Concurrency: {}", config.scraper.concurrency);
    tracing::info!("Scraper Timeout: {}s", config.scraper.timeout_secs);
    tracing::info!("User Agent: {}", config.scraper.user_agent);
    tracing::info!("Storage Backend: {}", config.storage.backend.as_str());
    if config.storage.backend == StorageBackend::Json {
        tracing::info!("Data Directory: {:?}", config.storage.data_dir);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("Log JSON: {}", config.log.json);
    tracing::info!("=================================");
}
