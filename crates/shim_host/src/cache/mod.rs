//! Cache-domain contracts and lightweight test adapters.

mod cache_storage;

pub use cache_storage::{CacheStorage, CacheStorageFuture, MatchOptions, MemoryCacheStorage};
