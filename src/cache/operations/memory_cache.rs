use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::cache::{CacheError, CacheStore};

/// 进程内缓存，未配置 Redis 时使用，测试中也用它替代 Redis
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, String>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟缓存服务宕机
    #[cfg(test)]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), CacheError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("memory cache switched off".to_string()));
        }
        Ok(())
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // 持锁期间不会 panic，锁中毒时继续使用内部数据
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check_available()?;
        Ok(self.entries().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.check_available()?;
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.check_available()?;
        self.entries().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.check_available()?;
        self.entries().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("k").await.unwrap(), None);

        cache.set("k", "v").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let cache = MemoryCache::new();
        let other = cache.clone();
        cache.set("membership_1_2", "not_member").await.unwrap();
        assert_eq!(
            other.get("membership_1_2").await.unwrap().as_deref(),
            Some("not_member")
        );

        other.clear().await.unwrap();
        assert_eq!(cache.get("membership_1_2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unavailable_cache_reports_errors() {
        let cache = MemoryCache::new();
        cache.set_unavailable(true);
        assert!(matches!(
            cache.get("k").await,
            Err(CacheError::Unavailable(_))
        ));
        assert!(cache.set("k", "v").await.is_err());

        cache.set_unavailable(false);
        assert_eq!(cache.get("k").await.unwrap(), None);
    }
}
