//! NovelScrape - 连载小说章节抓取服务

use std::sync::Arc;
use std::time::Duration;

use novelscrape::application::WorkRepositoryPort;
use novelscrape::config::{load_config, print_config, LogConfig, StorageBackend};
use novelscrape::infrastructure::adapters::{HtmlExtractor, HttpPageFetcher, HttpPageFetcherConfig};
use novelscrape::infrastructure::events::EventPublisher;
use novelscrape::infrastructure::http::{AppState, HttpServer};
use novelscrape::infrastructure::{InMemoryWorkStore, JsonWorkStore};
use tracing_subscriber::EnvFilter;

fn init_tracing(log: &LogConfig) {
    // RUST_LOG 优先于配置文件
    let log_filter = format!("{},novelscrape={},tower_http=debug", log.level, log.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("NovelScrape - serialized fiction scraper");
    print_config(&config);

    // 存储后端
    let work_repo: Arc<dyn WorkRepositoryPort> = match config.storage.backend {
        StorageBackend::Json => Arc::new(JsonWorkStore::new(&config.storage.data_dir).await?),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, works are lost on shutdown");
            Arc::new(InMemoryWorkStore::new())
        }
    };

    // 页面抓取与选择器提取
    let fetcher_config = HttpPageFetcherConfig::default()
        .with_timeout(config.scraper.timeout_secs)
        .with_user_agent(config.scraper.user_agent.clone());
    let page_fetcher = Arc::new(HttpPageFetcher::new(fetcher_config)?);
    let extractor = Arc::new(HtmlExtractor::new());

    // 创建事件发布器
    let event_publisher = Arc::new(EventPublisher::new());

    let state = AppState::new(
        work_repo,
        page_fetcher,
        extractor,
        event_publisher,
        Duration::from_secs(config.scraper.timeout_secs),
        config.scraper.concurrency,
    );

    let server = HttpServer::new(config.server.clone(), state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
