// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use metrics::counter;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::models::cached_result::{CachedResult, CrawlInfo};
use crate::infrastructure::cache::store::{SharedStore, StoreError};
use crate::utils::url_utils::normalize_for_cache;

const KEY_PREFIX: &str = "crawler:emails:";

/// 缓存统计信息
#[derive(Debug, Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
}

/// 缓存统计快照
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsSnapshot {
    pub enabled: bool,
    pub cached_urls: usize,
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub hit_rate: f64,
    pub ttl_seconds: u64,
}

/// 缓存管理器
///
/// 以规范化URL的摘要为键保存爬取结果。存储不可用或缓存被关闭时
/// 退化为永远未命中、写入无操作
pub struct CacheManager {
    store: Option<SharedStore>,
    ttl: Duration,
    deduplicate: bool,
    stats: CacheStats,
}

impl CacheManager {
    /// 创建新的缓存管理器
    ///
    /// # 参数
    ///
    /// * `store` - 底层存储，`None` 表示退化模式
    /// * `ttl` - 条目过期时间
    /// * `deduplicate` - 写入时是否规范化邮箱列表
    pub fn new(store: Option<SharedStore>, ttl: Duration, deduplicate: bool) -> Self {
        if store.is_none() {
            info!("Result cache disabled, running in degraded mode");
        }
        Self {
            store,
            ttl,
            deduplicate,
            stats: CacheStats::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// 计算缓存键：`crawler:emails:` + sha256(小写主机 + 路径)
    pub fn cache_key(url: &str) -> String {
        let digest = Sha256::digest(normalize_for_cache(url).as_bytes());
        format!("{}{}", KEY_PREFIX, hex::encode(digest))
    }

    /// 获取缓存结果
    ///
    /// 存储错误和损坏的条目都按未命中处理
    pub async fn get(&self, url: &str) -> Option<CachedResult> {
        let store = self.store.as_ref()?;
        let key = Self::cache_key(url);

        let cached = match store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<CachedResult>(&raw) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!(url, error = %e, "Discarding corrupt cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(url, error = %e, "Cache lookup failed");
                None
            }
        };

        if cached.is_some() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            counter!("cache_hits_total").increment(1);
            debug!(url, "Cache hit");
        } else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            counter!("cache_misses_total").increment(1);
            debug!(url, "Cache miss");
        }
        cached
    }

    /// 写入爬取结果
    pub async fn set(
        &self,
        url: &str,
        emails: &[String],
        depth: usize,
        pages_visited: usize,
    ) -> Result<(), StoreError> {
        let Some(store) = self.store.as_ref() else {
            return Ok(());
        };

        let emails = if self.deduplicate {
            Self::deduplicate_emails(emails)
        } else {
            emails.to_vec()
        };
        let result = CachedResult {
            emails,
            timestamp: Utc::now(),
            crawl_info: CrawlInfo {
                depth,
                pages_visited,
            },
        };
        let payload = serde_json::to_string(&result)?;
        store
            .set_ex(&Self::cache_key(url), &payload, self.ttl)
            .await?;

        self.stats.stores.fetch_add(1, Ordering::Relaxed);
        debug!(url, emails = result.emails.len(), "Cached crawl result");
        Ok(())
    }

    /// 删除单个URL的缓存
    pub async fn invalidate(&self, url: &str) -> Result<(), StoreError> {
        if let Some(store) = self.store.as_ref() {
            store.del(&Self::cache_key(url)).await?;
            info!(url, "Cache entry invalidated");
        }
        Ok(())
    }

    /// 清空全部爬取结果
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        let Some(store) = self.store.as_ref() else {
            return Ok(());
        };
        let keys = store.keys(&format!("{}*", KEY_PREFIX)).await?;
        for key in &keys {
            store.del(key).await?;
        }
        info!(removed = keys.len(), "Cache cleared");
        Ok(())
    }

    /// 获取缓存统计信息
    pub async fn stats(&self) -> CacheStatsSnapshot {
        let cached_urls = match self.store.as_ref() {
            Some(store) => match store.keys(&format!("{}*", KEY_PREFIX)).await {
                Ok(keys) => keys.len(),
                Err(e) => {
                    warn!(error = %e, "Failed to count cached urls");
                    0
                }
            },
            None => 0,
        };

        let hits = self.stats.hits.load(Ordering::Relaxed);
        let misses = self.stats.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStatsSnapshot {
            enabled: self.is_enabled(),
            cached_urls,
            hits,
            misses,
            stores: self.stats.stores.load(Ordering::Relaxed),
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
            ttl_seconds: self.ttl.as_secs(),
        }
    }

    /// 去除空白、转小写、去重并排序
    pub fn deduplicate_emails(emails: &[String]) -> Vec<String> {
        emails
            .iter()
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
