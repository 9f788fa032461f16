//! Service-worker lifecycle registration.

use std::rc::Rc;

use shim_host::LifecycleHandler;

/// Routes the worker's `install`, `activate` and `fetch` events to `handler`.
///
/// `install` and `activate` are held open with `waitUntil` until the handler settles; `fetch`
/// answers through `respondWith`. Outside `wasm32` this is a no-op.
///
/// # Errors
///
/// Returns an error when the global scope is not a service worker or a listener cannot be
/// attached.
pub fn register_lifecycle(handler: Rc<dyn LifecycleHandler>) -> Result<(), String> {
    crate::bridge::register_lifecycle(handler)
}
