// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::services::crawl_service::EmailCrawler;
use crate::domain::services::scan_service::ScanService;
use crate::engines::reqwest_engine::ReqwestEngine;
use crate::engines::traits::PageFetcher;
use crate::infrastructure::cache::cache_manager::CacheManager;
use crate::infrastructure::cache::memory_store::MemoryStore;
use crate::infrastructure::cache::redis_client::RedisClient;
use crate::infrastructure::cache::store::SharedStore;
use crate::presentation::routes;
use crate::presentation::state::AppState;
use crate::queue::job_queue::{JobQueue, KvJobQueue};
use crate::workers::manager::WorkerManager;
use crate::workers::webhook_dispatcher::WebhookDispatcher;
use axum::Router;
use std::sync::Arc;
use tracing::{info, warn};

/// 进程内存储的连接地址
pub const MEMORY_STORE_URL: &str = "memory://";

/// 组装完成的应用
pub struct Application {
    /// HTTP路由
    pub router: Router,
    /// 共享状态
    pub state: AppState,
    /// 工作管理器，异步扫描关闭时为 `None`，尚未启动
    pub workers: Option<WorkerManager>,
}

/// 根据配置创建底层存储
pub fn connect_store(redis_url: &str) -> anyhow::Result<SharedStore> {
    if redis_url.starts_with(MEMORY_STORE_URL) {
        info!("Using in-process store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let client = RedisClient::new(redis_url)?;
    info!("Redis client initialized");
    Ok(Arc::new(client))
}

/// 使用默认的reqwest抓取引擎
pub fn default_fetcher(settings: &Settings) -> anyhow::Result<Arc<dyn PageFetcher>> {
    let engine = ReqwestEngine::new(&settings.crawler.user_agent, settings.crawler.page_timeout())?;
    Ok(Arc::new(engine))
}

/// 组装缓存、爬虫、任务队列、工作器和路由
///
/// 存储无法 `ping` 通或缓存被关闭时，结果缓存以退化模式运行
pub async fn build_application(
    settings: &Settings,
    store: SharedStore,
    fetcher: Arc<dyn PageFetcher>,
) -> anyhow::Result<Application> {
    let store_healthy = match store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Store unavailable, result cache degraded");
            false
        }
    };

    let cache_store = (settings.cache.enabled && store_healthy).then(|| store.clone());
    let cache = Arc::new(CacheManager::new(
        cache_store,
        settings.cache.ttl(),
        settings.crawler.deduplicate_emails,
    ));
    let crawler = Arc::new(EmailCrawler::new(fetcher, settings.crawler.max_depth));
    let scanner = Arc::new(ScanService::new(crawler, cache));

    let (queue, workers) = if settings.async_jobs.enabled {
        let queue: Arc<dyn JobQueue> = Arc::new(KvJobQueue::new(
            store,
            settings.async_jobs.retention(),
        ));
        let dispatcher = WebhookDispatcher::new(&settings.webhook)?;
        let workers = WorkerManager::new(
            queue.clone(),
            scanner.clone(),
            dispatcher,
            settings.async_jobs.job_timeout(),
            settings.async_jobs.poll_timeout(),
        );
        (Some(queue), Some(workers))
    } else {
        info!("Async scanning disabled");
        (None, None)
    };

    let state = AppState {
        scanner,
        queue,
        jobs: settings.async_jobs.clone(),
    };
    let router = routes::routes(state.clone());

    Ok(Application {
        router,
        state,
        workers,
    })
}
