//! Live network fetch contracts and adapters.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use super::request::{Request, Response};

/// Object-safe boxed future used by [`NetworkFetch`].
pub type NetworkFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service performing a live network fetch.
///
/// Implementations never retry. An `Err` means the request could not complete at all; HTTP
/// error statuses are successful fetches carrying an error [`Response`].
pub trait NetworkFetch {
    /// Performs `request` against the network.
    fn fetch<'a>(&'a self, request: &'a Request) -> NetworkFuture<'a, Result<Response, String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Network adapter for hosts without connectivity; every fetch fails.
pub struct NoopNetwork;

impl NetworkFetch for NoopNetwork {
    fn fetch<'a>(&'a self, request: &'a Request) -> NetworkFuture<'a, Result<Response, String>> {
        Box::pin(async move { Err(format!("network unavailable: {}", request.url)) })
    }
}

#[derive(Debug, Clone)]
enum Route {
    Respond(Response),
    Fail(String),
}

#[derive(Debug, Clone, Default)]
/// In-memory network keyed by exact request URL that records every request it receives.
///
/// Unrouted URLs fail as unreachable.
pub struct MemoryNetwork {
    routes: Rc<RefCell<HashMap<String, Route>>>,
    requests: Rc<RefCell<Vec<Request>>>,
}

impl MemoryNetwork {
    /// Serves `response` for requests whose URL equals `url`.
    pub fn route(&self, url: impl Into<String>, response: Response) -> &Self {
        self.routes
            .borrow_mut()
            .insert(url.into(), Route::Respond(response));
        self
    }

    /// Serves a `200` response with `body` for `url`.
    pub fn route_ok(&self, url: &str, body: &str) -> &Self {
        self.route(url, Response::new(url, 200, body))
    }

    /// Makes requests for `url` fail with `message`.
    pub fn fail(&self, url: impl Into<String>, message: impl Into<String>) -> &Self {
        self.routes
            .borrow_mut()
            .insert(url.into(), Route::Fail(message.into()));
        self
    }

    /// Returns every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    /// Returns how many requests were received.
    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl NetworkFetch for MemoryNetwork {
    fn fetch<'a>(&'a self, request: &'a Request) -> NetworkFuture<'a, Result<Response, String>> {
        Box::pin(async move {
            self.requests.borrow_mut().push(request.clone());
            match self.routes.borrow().get(&request.url) {
                Some(Route::Respond(response)) => Ok(response.clone()),
                Some(Route::Fail(message)) => Err(message.clone()),
                None => Err(format!("network unreachable: {}", request.url)),
            }
        })
    }
}
