//! Lifecycle handler contract for the service-worker `install`, `activate` and `fetch` events.

use std::{future::Future, pin::Pin};

use crate::fetch::request::{Request, Response};

/// Object-safe boxed future used by [`LifecycleHandler`].
pub type LifecycleFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Handler the host invokes for each lifecycle event.
///
/// The host keeps the event alive until the returned future settles; a rejection fails the
/// triggering phase (or the intercepted request).
pub trait LifecycleHandler {
    /// Handles `install`.
    fn on_install<'a>(&'a self) -> LifecycleFuture<'a, Result<(), String>>;

    /// Handles `activate`.
    fn on_activate<'a>(&'a self) -> LifecycleFuture<'a, Result<(), String>>;

    /// Produces the response for an intercepted `fetch`.
    fn on_fetch<'a>(&'a self, request: &'a Request)
        -> LifecycleFuture<'a, Result<Response, String>>;
}
