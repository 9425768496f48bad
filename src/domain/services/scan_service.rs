// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::cached_result::CachedResult;
use crate::domain::models::scan_job::format_crawl_time;
use crate::domain::services::crawl_service::{CrawlOutcome, DynCrawler};
use crate::infrastructure::cache::cache_manager::CacheManager;
use crate::utils::url_utils::parse_scan_url;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

/// 扫描错误类型
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScanError {
    /// 缺少或无法解析的URL
    #[error("{0}")]
    InvalidUrl(String),
}

/// 同步扫描响应
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub from_cache: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_time: Option<String>,
}

/// 扫描服务
///
/// 把爬虫和结果缓存组合成"先查缓存，未命中再爬取并写回"的流程，
/// 同步接口和后台工作器共用
pub struct ScanService {
    crawler: Arc<DynCrawler>,
    cache: Arc<CacheManager>,
}

impl ScanService {
    pub fn new(crawler: Arc<DynCrawler>, cache: Arc<CacheManager>) -> Self {
        Self { crawler, cache }
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    /// 查询缓存结果
    pub async fn lookup(&self, url: &str) -> Option<CachedResult> {
        self.cache.get(url).await
    }

    /// 执行爬取并写入缓存
    ///
    /// 缓存写入失败只记录日志，不影响返回的结果
    pub async fn crawl_and_store(&self, url: &Url) -> CrawlOutcome {
        let outcome = self.crawler.crawl(url).await;
        if let Err(e) = self
            .cache
            .set(
                url.as_str(),
                &outcome.emails,
                self.crawler.max_depth(),
                outcome.pages_visited,
            )
            .await
        {
            warn!(url = %url, error = %e, "Failed to cache crawl result");
        }
        outcome
    }

    /// 同步扫描
    ///
    /// 缺少协议的地址会补全为 `https://`
    #[instrument(skip(self))]
    pub async fn scan(&self, raw_url: &str) -> Result<ScanResponse, ScanError> {
        let started = Instant::now();
        let url = parse_scan_url(raw_url).map_err(ScanError::InvalidUrl)?;

        if let Some(cached) = self.lookup(url.as_str()).await {
            info!(url = %url, emails = cached.emails.len(), "Served scan from cache");
            return Ok(ScanResponse {
                emails: Some(cached.emails),
                error: None,
                from_cache: true,
                crawl_time: Some(format_crawl_time(started.elapsed())),
            });
        }

        let outcome = self.crawl_and_store(&url).await;
        Ok(ScanResponse {
            emails: Some(CacheManager::deduplicate_emails(&outcome.emails)),
            error: None,
            from_cache: false,
            crawl_time: Some(format_crawl_time(started.elapsed())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::traits::{EngineError, FetchedPage, PageFetcher};
    use crate::domain::services::crawl_service::EmailCrawler;
    use crate::infrastructure::cache::memory_store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// 每个URL都返回同一页面，并统计调用次数
    struct StaticPage {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for StaticPage {
        async fn fetch(&self, _url: &Url) -> Result<FetchedPage, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchedPage {
                status_code: 200,
                text: "Contact: Info@Example.com".to_string(),
                ..FetchedPage::default()
            })
        }

        fn name(&self) -> &'static str {
            "static"
        }
    }

    fn service() -> (Arc<StaticPage>, ScanService) {
        let fetcher = Arc::new(StaticPage {
            calls: AtomicUsize::new(0),
        });
        let crawler = Arc::new(EmailCrawler::new(
            fetcher.clone() as Arc<dyn PageFetcher>,
            3,
        ));
        let cache = Arc::new(CacheManager::new(
            Some(Arc::new(MemoryStore::new())),
            Duration::from_secs(60),
            true,
        ));
        (fetcher, ScanService::new(crawler, cache))
    }

    #[tokio::test]
    async fn test_scan_crawls_then_serves_from_cache() {
        let (fetcher, service) = service();

        let first = service.scan("example.com").await.unwrap();
        assert_eq!(first.emails, Some(vec!["info@example.com".to_string()]));
        assert!(!first.from_cache);
        assert!(first.crawl_time.is_some());

        let second = service.scan("https://EXAMPLE.com/").await.unwrap();
        assert_eq!(second.emails, Some(vec!["info@example.com".to_string()]));
        assert!(second.from_cache);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_scan_rejects_invalid_urls() {
        let (fetcher, service) = service();

        assert!(matches!(
            service.scan("").await,
            Err(ScanError::InvalidUrl(_))
        ));
        assert!(matches!(
            service.scan("ftp://example.com").await,
            Err(ScanError::InvalidUrl(_))
        ));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_response_omits_absent_fields() {
        let response = ScanResponse {
            emails: Some(vec![]),
            from_cache: false,
            ..ScanResponse::default()
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["emails"], serde_json::json!([]));
        assert!(value.get("error").is_none());
        assert!(value.get("crawl_time").is_none());
    }
}
