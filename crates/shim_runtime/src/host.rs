//! Process-wide wiring of host adapters into the shim runtime.
//!
//! The adapter bundle comes from `shim_host_web`, which picks browser or stub implementations at
//! compile time. Everything built here shares one storage area and one notification registry per
//! thread.

use std::rc::Rc;

use shim_host::ShimServices;
use shim_host_web::build_shim_services;

use crate::{CacheGateway, GatewayConfig, GatewayError, NotificationCenter, StorageNamespace};

#[derive(Clone)]
/// Host collaborator bundle plus the runtime facades built over it.
pub struct ShimHostContext {
    services: ShimServices,
    storage: StorageNamespace,
    notifications: NotificationCenter,
}

impl Default for ShimHostContext {
    fn default() -> Self {
        Self::from_services(build_shim_services())
    }
}

impl ShimHostContext {
    /// Builds the runtime facades over an explicit collaborator bundle.
    pub fn from_services(services: ShimServices) -> Self {
        let storage = StorageNamespace::new(services.store.clone());
        let notifications = NotificationCenter::new(services.notifications.clone());
        Self {
            services,
            storage,
            notifications,
        }
    }

    /// Returns the collaborator bundle.
    pub fn services(&self) -> &ShimServices {
        &self.services
    }

    /// Returns the storage namespace. Clones share one area.
    pub fn storage(&self) -> StorageNamespace {
        self.storage.clone()
    }

    /// Returns the notification registry. Clones share one registry.
    pub fn notifications(&self) -> NotificationCenter {
        self.notifications.clone()
    }

    /// Builds a cache gateway over this context's cache and network services.
    ///
    /// # Errors
    ///
    /// Returns an error when `config` is invalid.
    pub fn cache_gateway(&self, config: GatewayConfig) -> Result<CacheGateway, GatewayError> {
        CacheGateway::from_services(&self.services, config)
    }

    /// Returns the host strategy token for diagnostics.
    pub fn host_strategy_name(&self) -> &'static str {
        self.services.host_strategy.as_str()
    }
}

thread_local! {
    static HOST_CONTEXT: ShimHostContext = ShimHostContext::default();
}

/// Returns the process-local host context.
pub fn host_context() -> ShimHostContext {
    HOST_CONTEXT.with(|context| context.clone())
}

/// Returns the process-local storage namespace.
pub fn storage() -> StorageNamespace {
    host_context().storage()
}

/// Returns the process-local notification registry.
pub fn notifications() -> NotificationCenter {
    host_context().notifications()
}

/// Builds a cache gateway over the process-local host services.
///
/// # Errors
///
/// Returns an error when `config` is invalid.
pub fn cache_gateway(config: GatewayConfig) -> Result<CacheGateway, GatewayError> {
    host_context().cache_gateway(config)
}

/// Hands `gateway` the host's `install`, `activate` and `fetch` events.
///
/// # Errors
///
/// Returns [`GatewayError::Registration`] when the host cannot attach the listeners, for example
/// outside a service worker scope.
pub fn register_lifecycle(gateway: CacheGateway) -> Result<(), GatewayError> {
    shim_host_web::register_lifecycle(Rc::new(gateway)).map_err(GatewayError::Registration)
}
