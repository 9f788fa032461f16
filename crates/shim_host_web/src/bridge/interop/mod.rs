//! Shared transport interop for browser bridge domains.
//!
//! This module routes calls to target-specific implementations while preserving a uniform API
//! for higher-level bridge domain modules.

use std::rc::Rc;

use shim_host::{
    LifecycleHandler, MatchOptions, NotificationPermission, NotificationRequest, Request,
    Response,
};

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

pub async fn cache_open(cache_name: &str) -> Result<(), String> {
    imp::cache_open(cache_name).await
}

pub async fn cache_match(
    cache_name: &str,
    request: &Request,
    options: MatchOptions,
) -> Result<Option<Response>, String> {
    imp::cache_match(cache_name, request, options).await
}

pub async fn cache_add_all(cache_name: &str, locators: &[String]) -> Result<(), String> {
    imp::cache_add_all(cache_name, locators).await
}

pub async fn cache_keys() -> Result<Vec<String>, String> {
    imp::cache_keys().await
}

pub async fn cache_delete(cache_name: &str) -> Result<bool, String> {
    imp::cache_delete(cache_name).await
}

pub async fn network_fetch(request: &Request) -> Result<Response, String> {
    imp::network_fetch(request).await
}

pub async fn notification_show(request: &NotificationRequest) -> Result<(), String> {
    imp::notification_show(request).await
}

pub async fn notification_close(tag: &str) -> Result<(), String> {
    imp::notification_close(tag).await
}

pub async fn notification_permission() -> NotificationPermission {
    imp::notification_permission().await
}

pub fn register_lifecycle(handler: Rc<dyn LifecycleHandler>) -> Result<(), String> {
    imp::register_lifecycle(handler)
}
