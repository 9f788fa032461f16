//! Cache API-backed cache storage implementation.

use shim_host::{CacheStorage, CacheStorageFuture, MatchOptions, Request, Response};

#[derive(Debug, Clone, Copy, Default)]
/// Browser cache storage backed by the global `caches` object.
pub struct WebCacheStorage;

impl CacheStorage for WebCacheStorage {
    fn open<'a>(&'a self, cache_name: &'a str) -> CacheStorageFuture<'a, Result<(), String>> {
        Box::pin(async move { crate::bridge::cache_open(cache_name).await })
    }

    fn match_request<'a>(
        &'a self,
        cache_name: &'a str,
        request: &'a Request,
        options: MatchOptions,
    ) -> CacheStorageFuture<'a, Result<Option<Response>, String>> {
        Box::pin(async move { crate::bridge::cache_match(cache_name, request, options).await })
    }

    fn add_all<'a>(
        &'a self,
        cache_name: &'a str,
        locators: &'a [String],
    ) -> CacheStorageFuture<'a, Result<(), String>> {
        Box::pin(async move { crate::bridge::cache_add_all(cache_name, locators).await })
    }

    fn keys<'a>(&'a self) -> CacheStorageFuture<'a, Result<Vec<String>, String>> {
        Box::pin(async move { crate::bridge::cache_keys().await })
    }

    fn delete<'a>(&'a self, cache_name: &'a str) -> CacheStorageFuture<'a, Result<bool, String>> {
        Box::pin(async move { crate::bridge::cache_delete(cache_name).await })
    }
}
