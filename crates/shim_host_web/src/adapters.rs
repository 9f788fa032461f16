use std::rc::Rc;

use serde_json::Value;
use shim_host::{
    CacheStorage, CacheStorageFuture, HostStrategy, KeyValueFuture, KeyValueStore, MatchOptions,
    MemoryCacheStorage, MemoryKeyValueStore, MemoryNotificationService, NetworkFetch,
    NetworkFuture, NoopNetwork, NotificationFuture, NotificationPermission, NotificationRequest,
    NotificationService, Request, Response, ShimServices,
};

use crate::{WebCacheStorage, WebKeyValueStore, WebNetwork, WebNotificationService};

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(feature = "host-stub")]
    {
        HostStrategy::Stub
    }

    #[cfg(not(feature = "host-stub"))]
    {
        HostStrategy::Browser
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    selected_host_strategy().as_str()
}

/// Adapter enum that erases the concrete cache backend behind [`CacheStorage`].
#[derive(Clone)]
pub enum CacheStorageAdapter {
    /// Browser Cache API-backed storage.
    Browser(WebCacheStorage),
    /// In-memory storage for stub hosts.
    Stub(MemoryCacheStorage),
}

impl CacheStorage for CacheStorageAdapter {
    fn open<'a>(&'a self, cache_name: &'a str) -> CacheStorageFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(storage) => storage.open(cache_name),
            Self::Stub(storage) => storage.open(cache_name),
        }
    }

    fn match_request<'a>(
        &'a self,
        cache_name: &'a str,
        request: &'a Request,
        options: MatchOptions,
    ) -> CacheStorageFuture<'a, Result<Option<Response>, String>> {
        match self {
            Self::Browser(storage) => storage.match_request(cache_name, request, options),
            Self::Stub(storage) => storage.match_request(cache_name, request, options),
        }
    }

    fn add_all<'a>(
        &'a self,
        cache_name: &'a str,
        locators: &'a [String],
    ) -> CacheStorageFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(storage) => storage.add_all(cache_name, locators),
            Self::Stub(storage) => storage.add_all(cache_name, locators),
        }
    }

    fn keys<'a>(&'a self) -> CacheStorageFuture<'a, Result<Vec<String>, String>> {
        match self {
            Self::Browser(storage) => storage.keys(),
            Self::Stub(storage) => storage.keys(),
        }
    }

    fn delete<'a>(&'a self, cache_name: &'a str) -> CacheStorageFuture<'a, Result<bool, String>> {
        match self {
            Self::Browser(storage) => storage.delete(cache_name),
            Self::Stub(storage) => storage.delete(cache_name),
        }
    }
}

/// Adapter enum that erases the concrete network backend behind [`NetworkFetch`].
#[derive(Debug, Clone, Copy)]
pub enum NetworkFetchAdapter {
    /// Browser `fetch`.
    Browser(WebNetwork),
    /// Offline fallback used by stub hosts.
    Stub(NoopNetwork),
}

impl NetworkFetch for NetworkFetchAdapter {
    fn fetch<'a>(&'a self, request: &'a Request) -> NetworkFuture<'a, Result<Response, String>> {
        match self {
            Self::Browser(network) => network.fetch(request),
            Self::Stub(network) => network.fetch(request),
        }
    }
}

/// Adapter enum that erases the concrete storage engine behind [`KeyValueStore`].
#[derive(Debug, Clone)]
pub enum KeyValueStoreAdapter {
    /// Browser `localStorage`-backed engine.
    Browser(WebKeyValueStore),
    /// In-memory engine for stub hosts.
    Stub(MemoryKeyValueStore),
}

impl KeyValueStore for KeyValueStoreAdapter {
    fn get_item<'a>(&'a self, key: &'a str) -> KeyValueFuture<'a, Result<Option<Value>, String>> {
        match self {
            Self::Browser(store) => store.get_item(key),
            Self::Stub(store) => store.get_item(key),
        }
    }

    fn entries<'a>(&'a self) -> KeyValueFuture<'a, Result<Vec<(String, Value)>, String>> {
        match self {
            Self::Browser(store) => store.entries(),
            Self::Stub(store) => store.entries(),
        }
    }

    fn set_item<'a>(
        &'a self,
        key: &'a str,
        value: &'a Value,
    ) -> KeyValueFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(store) => store.set_item(key, value),
            Self::Stub(store) => store.set_item(key, value),
        }
    }

    fn remove_item<'a>(&'a self, key: &'a str) -> KeyValueFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(store) => store.remove_item(key),
            Self::Stub(store) => store.remove_item(key),
        }
    }

    fn clear<'a>(&'a self) -> KeyValueFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(store) => store.clear(),
            Self::Stub(store) => store.clear(),
        }
    }
}

/// Adapter enum that erases the concrete notification backend behind [`NotificationService`].
#[derive(Debug, Clone)]
pub enum NotificationServiceAdapter {
    /// Browser Web Notifications.
    Browser(WebNotificationService),
    /// Recording service for stub hosts.
    Stub(MemoryNotificationService),
}

impl NotificationService for NotificationServiceAdapter {
    fn show<'a>(
        &'a self,
        request: &'a NotificationRequest,
    ) -> NotificationFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(service) => service.show(request),
            Self::Stub(service) => service.show(request),
        }
    }

    fn close<'a>(&'a self, tag: &'a str) -> NotificationFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(service) => service.close(tag),
            Self::Stub(service) => service.close(tag),
        }
    }

    fn permission<'a>(&'a self) -> NotificationFuture<'a, NotificationPermission> {
        match self {
            Self::Browser(service) => service.permission(),
            Self::Stub(service) => service.permission(),
        }
    }
}

/// Returns the cache storage adapter for the selected host strategy.
pub fn cache_storage() -> CacheStorageAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => CacheStorageAdapter::Browser(WebCacheStorage),
        HostStrategy::Stub => CacheStorageAdapter::Stub(MemoryCacheStorage::default()),
    }
}

/// Returns the network adapter for the selected host strategy.
pub fn network_fetch() -> NetworkFetchAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => NetworkFetchAdapter::Browser(WebNetwork),
        HostStrategy::Stub => NetworkFetchAdapter::Stub(NoopNetwork),
    }
}

/// Returns the storage engine adapter for the selected host strategy.
pub fn key_value_store() -> KeyValueStoreAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => KeyValueStoreAdapter::Browser(WebKeyValueStore),
        HostStrategy::Stub => KeyValueStoreAdapter::Stub(MemoryKeyValueStore::default()),
    }
}

/// Returns the notification adapter for the selected host strategy.
pub fn notification_service() -> NotificationServiceAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => NotificationServiceAdapter::Browser(WebNotificationService),
        HostStrategy::Stub => {
            NotificationServiceAdapter::Stub(MemoryNotificationService::default())
        }
    }
}

/// Builds the collaborator bundle for the selected host strategy.
pub fn build_shim_services() -> ShimServices {
    ShimServices {
        caches: Rc::new(cache_storage()),
        network: Rc::new(network_fetch()),
        store: Rc::new(key_value_store()),
        notifications: Rc::new(notification_service()),
        host_strategy: selected_host_strategy(),
    }
}
