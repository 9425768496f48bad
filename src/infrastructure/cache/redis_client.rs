// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::infrastructure::cache::store::{KeyValueStore, StoreError};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, AsyncConnectionConfig};
use std::time::Duration;

/// 阻塞命令的响应超时在服务端等待时间之外额外留出的余量
const BLOCKING_RESPONSE_GRACE: Duration = Duration::from_secs(2);

/// Redis客户端
///
/// 提供对Redis数据库的异步操作接口
#[derive(Clone)]
pub struct RedisClient {
    /// Redis客户端
    client: redis::Client,
}

impl RedisClient {
    /// 创建新的Redis客户端实例
    ///
    /// 只解析连接地址，不建立连接；连通性由 `ping` 检查
    ///
    /// # 参数
    ///
    /// * `redis_url` - Redis连接URL
    pub fn new(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, StoreError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    /// 阻塞命令专用的连接
    ///
    /// 默认连接的响应超时短于阻塞等待时间，客户端放弃后服务端仍可能弹出元素并丢失
    async fn blocking_connection(&self, wait: Duration) -> Result<MultiplexedConnection, StoreError> {
        let config = AsyncConnectionConfig::new()
            .set_response_timeout(Some(blocking_response_timeout(wait)));
        Ok(self
            .client
            .get_multiplexed_async_connection_with_config(&config)
            .await?)
    }
}

/// 阻塞等待 `wait` 时客户端应使用的响应超时
fn blocking_response_timeout(wait: Duration) -> Duration {
    wait + BLOCKING_RESPONSE_GRACE
}

#[async_trait]
impl KeyValueStore for RedisClient {
    async fn ping(&self) -> Result<(), StoreError> {
        let mut con = self.connection().await?;
        redis::cmd("PING").query_async::<()>(&mut con).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut con = self.connection().await?;
        let value: Option<String> = con.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut con = self.connection().await?;
        con.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
            .await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        let mut con = self.connection().await?;
        con.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let mut con = self.connection().await?;
        let keys: Vec<String> = con.keys(pattern).await?;
        Ok(keys)
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut con = self.connection().await?;
        con.lpush::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn brpop(&self, key: &str, timeout: Duration) -> Result<Option<String>, StoreError> {
        // BRPOP holds its connection for the whole wait, so it never shares one
        let mut con = self.blocking_connection(timeout).await?;
        let popped: Option<(String, String)> = con.brpop(key, timeout.as_secs_f64()).await?;
        Ok(popped.map(|(_, value)| value))
    }

    async fn lrem(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        let mut con = self.connection().await?;
        let removed: u64 = con.lrem(key, 0, value).await?;
        Ok(removed)
    }

    async fn llen(&self, key: &str) -> Result<u64, StoreError> {
        let mut con = self.connection().await?;
        let len: u64 = con.llen(key).await?;
        Ok(len)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut con = self.connection().await?;
        con.sadd::<_, _, ()>(key, member).await?;
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut con = self.connection().await?;
        con.srem::<_, _, ()>(key, member).await?;
        Ok(())
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut con = self.connection().await?;
        let members: Vec<String> = con.smembers(key).await?;
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(RedisClient::new("not-a-redis-url").is_err());
        assert!(RedisClient::new("redis://127.0.0.1:6379/0").is_ok());
    }

    #[test]
    fn test_blocking_response_timeout_outlasts_server_wait() {
        for wait in [Duration::from_millis(100), Duration::from_secs(5), Duration::from_secs(30)] {
            assert!(blocking_response_timeout(wait) > wait);
        }
    }

    #[tokio::test]
    async fn test_brpop_fails_without_server() {
        let client = RedisClient::new("redis://127.0.0.1:1/0").unwrap();
        assert!(client.brpop("queue", Duration::from_millis(50)).await.is_err());
    }

    #[tokio::test]
    async fn test_ping_fails_without_server() {
        // Port 1 is reserved and never runs Redis
        let client = RedisClient::new("redis://127.0.0.1:1/0").unwrap();
        assert!(client.ping().await.is_err());
    }
}
