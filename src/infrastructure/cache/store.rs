// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// 存储层错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 键值存储接口
///
/// 结果缓存与任务存储共用的原子原语，每个方法对应一条Redis命令
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 连通性检查
    async fn ping(&self) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// 写入并设置过期时间
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    async fn del(&self, key: &str) -> Result<(), StoreError>;

    /// 按模式列出键，只支持末尾的 `*` 通配
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    async fn lpush(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// 阻塞式右弹出，超时返回 None
    async fn brpop(&self, key: &str, timeout: Duration) -> Result<Option<String>, StoreError>;

    /// 删除列表中所有等于 `value` 的元素，返回删除数量
    async fn lrem(&self, key: &str, value: &str) -> Result<u64, StoreError>;

    async fn llen(&self, key: &str) -> Result<u64, StoreError>;

    async fn sadd(&self, key: &str, member: &str) -> Result<(), StoreError>;

    async fn srem(&self, key: &str, member: &str) -> Result<(), StoreError>;

    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError>;
}

/// 共享存储句柄
pub type SharedStore = Arc<dyn KeyValueStore>;
