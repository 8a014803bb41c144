use redis::{AsyncCommands, Client as RedisClient};
use std::sync::Arc;

use crate::cache::{CacheError, CacheStore};

/// 每次 SCAN 返回的键数量提示
const SCAN_BATCH: usize = 200;

/// 基于 Redis 的共享缓存，所有键都带上命名空间前缀
#[derive(Clone)]
pub struct RedisCache {
    redis_client: Arc<RedisClient>,
    namespace: String,
}

impl RedisCache {
    /// 创建新的 Redis 缓存实例
    pub fn new(redis_client: Arc<RedisClient>, namespace: impl Into<String>) -> Self {
        Self {
            redis_client,
            namespace: namespace.into(),
        }
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }
}

impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(self.namespaced(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        // 成员资格缓存不设过期时间，只靠写操作显式失效
        let _: () = conn.set(self.namespaced(key), value).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(self.namespaced(key)).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let pattern = format!("{}*", self.namespace);

        // 用 SCAN 分批删除，避免 KEYS 阻塞 Redis
        let mut cursor: u64 = 0;
        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let _: () = conn.del(keys).await?;
            }

            if next_cursor == 0 {
                break;
            }
            cursor = next_cursor;
        }

        tracing::debug!("Cleared cache namespace {}", self.namespace);
        Ok(())
    }
}
