// 缓存操作
// 提供缓存后端的具体实现

// Redis 缓存
pub mod redis_cache;

// 进程内缓存
pub mod memory_cache;
