// 缓存模块
// 定义共享键值缓存的能力接口，以及 Redis 与进程内两种实现

use std::future::Future;

pub mod keys;
pub mod models;
pub mod operations;

pub use models::{CachedMembership, NOT_MEMBER};
pub use operations::{memory_cache::MemoryCache, redis_cache::RedisCache};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// 按字符串键读写的共享缓存。
///
/// 只保证单个键的 get/set 原子性，不提供事务；缓存不可用时调用方应直接回源查询。
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, CacheError>> + Send;

    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), CacheError>> + Send;

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), CacheError>> + Send;

    /// 清空本服务写入的所有缓存项
    fn clear(&self) -> impl Future<Output = Result<(), CacheError>> + Send;
}

/// 运行时选择的缓存后端
#[derive(Clone)]
pub enum AppCache {
    Redis(RedisCache),
    Memory(MemoryCache),
}

impl CacheStore for AppCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self {
            AppCache::Redis(cache) => cache.get(key).await,
            AppCache::Memory(cache) => cache.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        match self {
            AppCache::Redis(cache) => cache.set(key, value).await,
            AppCache::Memory(cache) => cache.set(key, value).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        match self {
            AppCache::Redis(cache) => cache.delete(key).await,
            AppCache::Memory(cache) => cache.delete(key).await,
        }
    }

    async fn clear(&self) -> Result<(), CacheError> {
        match self {
            AppCache::Redis(cache) => cache.clear().await,
            AppCache::Memory(cache) => cache.clear().await,
        }
    }
}
