//! Error types returned by the gateway, the storage facade and the notification registry.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures surfaced by [`crate::CacheGateway`] lifecycle phases and fetch interception.
pub enum GatewayError {
    /// The cache backend rejected an operation.
    #[error("{0}")]
    Backend(String),
    /// The live fetch failed and no cached entry existed.
    #[error("{0}")]
    Network(String),
    /// Pre-populating the current generation failed; nothing from this install is usable.
    #[error("failed to install cache `{cache}`: {reason}")]
    Install {
        /// Physical cache being populated.
        cache: String,
        /// Backend or fetch failure that aborted the install.
        reason: String,
    },
    /// No physical cache is configured for a logical cache name the gateway needs.
    #[error("no cache generation configured for `{0}`")]
    MissingGeneration(String),
    /// Gateway configuration is malformed.
    #[error("invalid gateway configuration: {0}")]
    Config(String),
    /// The host could not route its lifecycle events to the gateway.
    #[error("failed to register lifecycle handlers: {0}")]
    Registration(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures surfaced by [`crate::StorageArea`] operations.
pub enum StorageError {
    /// The storage engine rejected an operation.
    #[error("{0}")]
    Backend(String),
    /// A JSON selector had a shape other than null, string, string list or object.
    #[error("invalid storage selector: {0}")]
    InvalidSelector(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures surfaced by [`crate::NotificationCenter`].
pub enum NotificationError {
    /// The host refused to display the notification.
    #[error("notification dispatch failed: {0}")]
    Dispatch(String),
}
