//! Browser (`wasm32`) implementations of [`shim_host`] service contracts.
//!
//! This crate is the concrete browser-side wiring layer for the Cache API, live `fetch`,
//! `localStorage`-backed key/value storage, Web Notifications and service-worker lifecycle
//! events.
//!
//! Bridge bindings are split by domain under `bridge/`:
//! - `bridge::cache`
//! - `bridge::lifecycle`
//! - `bridge::network`
//! - `bridge::notify`
//! - `bridge::interop` (shared wasm/non-wasm transport glue)

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and concrete adapter factories for runtime wiring.
pub mod adapters;
mod bridge;
pub mod cache;
pub mod fetch;
pub mod lifecycle;
pub mod notifications;
pub mod storage;

pub use adapters::{
    build_shim_services, cache_storage, host_strategy_name, key_value_store, network_fetch,
    notification_service, selected_host_strategy, CacheStorageAdapter, KeyValueStoreAdapter,
    NetworkFetchAdapter, NotificationServiceAdapter,
};
pub use cache::cache_api::WebCacheStorage;
pub use fetch::WebNetwork;
pub use lifecycle::register_lifecycle;
pub use notifications::WebNotificationService;
pub use storage::local_store::{WebKeyValueStore, STORAGE_KEY_PREFIX};
