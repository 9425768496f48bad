// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、Redis、爬虫、缓存、异步任务、Webhook和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// Redis配置
    pub redis: RedisSettings,
    /// 爬虫配置
    pub crawler: CrawlerSettings,
    /// 结果缓存配置
    pub cache: CacheSettings,
    /// 异步任务配置
    pub async_jobs: AsyncJobSettings,
    /// Webhook 配置
    pub webhook: WebhookSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// Redis配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    /// Redis连接URL，`memory://` 表示使用进程内存储
    pub url: String,
}

/// 爬虫配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerSettings {
    /// 最大爬取深度
    pub max_depth: usize,
    /// 是否对邮箱去重并排序
    pub deduplicate_emails: bool,
    /// 单页抓取超时时间（秒）
    pub page_timeout_secs: u64,
    /// 抓取时使用的User-Agent
    pub user_agent: String,
}

/// 结果缓存配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// 是否启用缓存
    pub enabled: bool,
    /// 缓存过期时间（秒）
    pub ttl_secs: u64,
}

/// 异步任务配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct AsyncJobSettings {
    /// 是否启用异步扫描
    pub enabled: bool,
    /// 工作器数量
    pub workers: usize,
    /// 队列容量，超过后拒绝新任务
    pub queue_capacity: u64,
    /// 单个任务超时时间（秒）
    pub job_timeout_secs: u64,
    /// 出队阻塞等待时间（秒）
    pub poll_timeout_secs: u64,
    /// 任务记录保留时间（秒）
    pub retention_secs: u64,
}

/// Webhook配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookSettings {
    /// 单次投递超时时间（秒）
    pub timeout_secs: u64,
    /// 最大投递次数
    pub retries: u32,
    /// 线性退避基数（秒）
    pub backoff_secs: u64,
    /// 可选的签名密钥
    pub secret: Option<String>,
}

/// 指标导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用Prometheus导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、配置文件和环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("EMAIL_CRAWLER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// 仅使用内置默认值构建配置，不读取文件和环境变量
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("redis.url", "redis://127.0.0.1:6379/0")?
            .set_default("crawler.max_depth", 3)?
            .set_default("crawler.deduplicate_emails", true)?
            .set_default("crawler.page_timeout_secs", 15)?
            .set_default(
                "crawler.user_agent",
                "Mozilla/5.0 (compatible; email-crawler/0.1; +https://github.com/Kirky-X)",
            )?
            // 12 months of 30 days
            .set_default("cache.enabled", true)?
            .set_default("cache.ttl_secs", 12 * 30 * 24 * 3600)?
            .set_default("async_jobs.enabled", true)?
            .set_default("async_jobs.workers", 3)?
            .set_default("async_jobs.queue_capacity", 100)?
            .set_default("async_jobs.job_timeout_secs", 300)?
            .set_default("async_jobs.poll_timeout_secs", 5)?
            .set_default("async_jobs.retention_secs", 24 * 3600)?
            .set_default("webhook.timeout_secs", 10)?
            .set_default("webhook.retries", 3)?
            .set_default("webhook.backoff_secs", 2)?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }

    /// 服务监听地址
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl CrawlerSettings {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }
}

impl AsyncJobSettings {
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

impl WebhookSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
