//! Typed host-domain contracts and shared models used by the app shim runtime and browser
//! adapters.
//!
//! This crate is the API-first boundary for the collaborators the shim consumes: the cache
//! backend, live network fetch, the key/value storage engine, user-visible notifications and the
//! lifecycle handler the host drives.
//! Concrete browser adapters live in `shim_host_web`; the in-memory adapters here back tests and
//! stub hosts.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod cache;
pub mod fetch;
pub mod host;
pub mod lifecycle;
pub mod notifications;
pub mod storage;

pub use cache::{CacheStorage, CacheStorageFuture, MatchOptions, MemoryCacheStorage};
pub use fetch::network::{MemoryNetwork, NetworkFetch, NetworkFuture, NoopNetwork};
pub use fetch::request::{strip_query, Headers, Request, Response};
pub use host::{HostStrategy, ShimServices};
pub use lifecycle::{LifecycleFuture, LifecycleHandler};
pub use notifications::{
    MemoryNotificationService, NoopNotificationService, NotificationFuture,
    NotificationPermission, NotificationRequest, NotificationService,
};
pub use storage::{KeyValueFuture, KeyValueStore, MemoryKeyValueStore};
