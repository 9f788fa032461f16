//! App shim runtime: offline cache gateway, key/value storage facade and notification registry.
//!
//! The runtime consumes the collaborator contracts from `shim_host`:
//! - [`CacheGateway`] serves intercepted fetches from versioned caches and prunes stale
//!   generations on activation.
//! - [`StorageArea`] reads over four [`Selector`] shapes, batches writes into one change event
//!   and relays changes to subscribers. [`storage::compat`] adapts it to callback-style callers
//!   that inspect the last-error slot.
//! - [`NotificationCenter`] tracks displayed notifications by id.
//!
//! [`host_context`] wires these over the compile-time selected host adapters, and
//! [`register_lifecycle`] routes the host's worker events to a gateway.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod host;
pub mod last_error;
pub mod notifications;
pub mod storage;

pub use config::GatewayConfig;
pub use error::{GatewayError, NotificationError, StorageError};
pub use gateway::{
    generations::{CacheGenerations, APP_CACHE},
    no_store_request, CacheGateway, LifecycleEvent, LifecycleOutcome, NO_STORE_HEADERS,
};
pub use host::{
    cache_gateway, host_context, notifications, register_lifecycle, storage, ShimHostContext,
};
pub use last_error::{clear_last_error, last_error, set_last_error, LastError};
pub use notifications::{NotificationCenter, NotificationOptions, TemplateType};
pub use storage::{
    ChangeBus, ChangeEvent, Selector, StorageArea, StorageChange, StorageItems, StorageNamespace,
    SubscriptionId,
};
