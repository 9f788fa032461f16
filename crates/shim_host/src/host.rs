//! Shared host-bundle model for browser and stub runtime composition.

use std::rc::Rc;

use crate::{
    CacheStorage, KeyValueStore, MemoryCacheStorage, MemoryKeyValueStore, MemoryNetwork,
    MemoryNotificationService, NetworkFetch, NotificationService,
};

/// Stable host strategy selected for the current build/runtime composition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Browser-backed composition over web-platform primitives.
    Browser,
    /// In-memory composition for tests and hosts without web APIs.
    Stub,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Stub => "stub",
        }
    }
}

/// Runtime-selected collaborator bundle injected into the shim runtime.
///
/// Environment-specific selection happens before this bundle crosses into `shim_runtime`, which
/// keeps the gateway and storage facade decoupled from browser adapter details.
#[derive(Clone)]
pub struct ShimServices {
    /// Named response caches.
    pub caches: Rc<dyn CacheStorage>,
    /// Live network fetch.
    pub network: Rc<dyn NetworkFetch>,
    /// Key/value storage engine behind the storage areas.
    pub store: Rc<dyn KeyValueStore>,
    /// User-visible notification delivery.
    pub notifications: Rc<dyn NotificationService>,
    /// Strategy identifier for diagnostics.
    pub host_strategy: HostStrategy,
}

impl ShimServices {
    /// Builds an in-memory bundle whose cache storage pre-populates through `network`.
    pub fn memory(network: MemoryNetwork) -> Self {
        let network: Rc<dyn NetworkFetch> = Rc::new(network);
        Self {
            caches: Rc::new(MemoryCacheStorage::with_origin(Rc::clone(&network))),
            network,
            store: Rc::new(MemoryKeyValueStore::default()),
            notifications: Rc::new(MemoryNotificationService::default()),
            host_strategy: HostStrategy::Stub,
        }
    }
}
