//! Offline-first fetch interception over versioned caches.
//!
//! The gateway is driven by three host lifecycle triggers:
//! - install: pre-populate the current `app` cache with the configured manifest
//! - activate: delete every physical cache outside the current generation
//! - fetch: serve from the `app` cache ignoring the query string, else go to the network with
//!   caching disabled
//!
//! Cache misses are never written back. [`CacheGateway`] implements
//! [`shim_host::LifecycleHandler`] so a host can route its worker events straight to it.

pub mod generations;

use std::rc::Rc;

use futures::future::try_join_all;
use leptos::logging;
use shim_host::{
    CacheStorage, Headers, LifecycleFuture, LifecycleHandler, MatchOptions, NetworkFetch,
    Request, Response, ShimServices,
};

use crate::{GatewayConfig, GatewayError};
use generations::APP_CACHE;

/// Headers attached to every network fallback request.
pub const NO_STORE_HEADERS: [(&str, &str); 3] = [
    ("Cache-Control", "no-cache, no-store, must-revalidate"),
    ("Pragma", "no-cache"),
    ("Expires", "0"),
];

/// Returns a copy of `request` whose headers are exactly [`NO_STORE_HEADERS`].
///
/// URL, method and body are kept; every header of the original request is dropped.
pub fn no_store_request(request: &Request) -> Request {
    let mut headers = Headers::default();
    for (name, value) in NO_STORE_HEADERS {
        headers.set(name, value);
    }
    Request {
        headers,
        ..request.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Lifecycle trigger delivered by the hosting environment.
pub enum LifecycleEvent {
    /// Pre-populate the current generation.
    Install,
    /// Prune stale generations.
    Activate,
    /// Serve an intercepted request.
    Fetch(Request),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of a successfully handled [`LifecycleEvent`].
pub enum LifecycleOutcome {
    /// Every manifest resource is cached.
    Installed,
    /// Stale caches were removed.
    Activated {
        /// Physical caches deleted during activation.
        deleted: Vec<String>,
    },
    /// Response for an intercepted request.
    Responded(Response),
}

/// Cache-backed fetch handler with generation-based invalidation.
pub struct CacheGateway {
    caches: Rc<dyn CacheStorage>,
    network: Rc<dyn NetworkFetch>,
    config: GatewayConfig,
}

impl CacheGateway {
    /// Creates a gateway over explicit collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error when `config` fails [`GatewayConfig::validate`].
    pub fn new(
        caches: Rc<dyn CacheStorage>,
        network: Rc<dyn NetworkFetch>,
        config: GatewayConfig,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        Ok(Self {
            caches,
            network,
            config,
        })
    }

    /// Creates a gateway over the cache and network services of a host bundle.
    ///
    /// # Errors
    ///
    /// Returns an error when `config` fails [`GatewayConfig::validate`].
    pub fn from_services(
        services: &ShimServices,
        config: GatewayConfig,
    ) -> Result<Self, GatewayError> {
        Self::new(
            Rc::clone(&services.caches),
            Rc::clone(&services.network),
            config,
        )
    }

    /// Returns the configuration this gateway was built with.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn app_cache(&self) -> Result<&str, GatewayError> {
        self.config
            .generations
            .current(APP_CACHE)
            .ok_or_else(|| GatewayError::MissingGeneration(APP_CACHE.to_string()))
    }

    /// Opens the current `app` cache and adds every manifest resource to it.
    ///
    /// The bulk add is atomic; any failure aborts the whole install.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Install`] when opening the cache or adding any resource fails.
    pub async fn install(&self) -> Result<(), GatewayError> {
        let cache = self.app_cache()?;
        let install_error = |reason: String| GatewayError::Install {
            cache: cache.to_string(),
            reason,
        };

        self.caches.open(cache).await.map_err(install_error)?;
        self.caches
            .add_all(cache, &self.config.cached_files)
            .await
            .map_err(install_error)?;
        logging::log!(
            "installed {} cached resources into `{cache}`",
            self.config.cached_files.len()
        );
        Ok(())
    }

    /// Deletes every physical cache that is not part of the current generation.
    ///
    /// Deletions run concurrently and the call resolves only after all of them settle. Returns
    /// the names the backend reported as actually deleted; a cache that vanished between listing
    /// and deletion is left out.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Backend`] when listing or deleting any cache fails.
    pub async fn activate(&self) -> Result<Vec<String>, GatewayError> {
        let desired = self.config.generations.desired();
        let stale: Vec<String> = self
            .caches
            .keys()
            .await
            .map_err(GatewayError::Backend)?
            .into_iter()
            .filter(|name| !desired.contains(name.as_str()))
            .collect();

        let outcomes = try_join_all(stale.iter().map(|name| self.caches.delete(name)))
            .await
            .map_err(GatewayError::Backend)?;
        let deleted: Vec<String> = stale
            .into_iter()
            .zip(outcomes)
            .filter_map(|(name, existed)| existed.then_some(name))
            .collect();
        for name in &deleted {
            logging::log!("deleted stale cache `{name}`");
        }
        Ok(deleted)
    }

    /// Serves `request` from the current `app` cache or, on a miss, from the network.
    ///
    /// The cache lookup ignores the query string. A hit is returned without any network call.
    /// A miss performs exactly one network fetch of the original request with
    /// [`NO_STORE_HEADERS`] and returns its response unmodified, error statuses included.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Backend`] when the cache rejects the lookup and
    /// [`GatewayError::Network`] when the network fetch fails.
    pub async fn fetch(&self, request: &Request) -> Result<Response, GatewayError> {
        let cache = self.app_cache()?;
        self.caches
            .open(cache)
            .await
            .map_err(GatewayError::Backend)?;

        let lookup = request.without_query();
        let cached = self
            .caches
            .match_request(cache, &lookup, MatchOptions::default())
            .await
            .map_err(GatewayError::Backend)?;
        if let Some(response) = cached {
            return Ok(response);
        }

        let live = no_store_request(request);
        self.network
            .fetch(&live)
            .await
            .map_err(GatewayError::Network)
    }

    /// Dispatches one lifecycle trigger.
    ///
    /// # Errors
    ///
    /// Propagates the error of the phase that handled `event`.
    pub async fn handle(&self, event: LifecycleEvent) -> Result<LifecycleOutcome, GatewayError> {
        match event {
            LifecycleEvent::Install => {
                self.install().await?;
                Ok(LifecycleOutcome::Installed)
            }
            LifecycleEvent::Activate => {
                let deleted = self.activate().await?;
                Ok(LifecycleOutcome::Activated { deleted })
            }
            LifecycleEvent::Fetch(request) => {
                self.fetch(&request).await.map(LifecycleOutcome::Responded)
            }
        }
    }
}

impl LifecycleHandler for CacheGateway {
    fn on_install<'a>(&'a self) -> LifecycleFuture<'a, Result<(), String>> {
        Box::pin(async move { self.install().await.map_err(|err| err.to_string()) })
    }

    fn on_activate<'a>(&'a self) -> LifecycleFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.activate()
                .await
                .map(|_| ())
                .map_err(|err| err.to_string())
        })
    }

    fn on_fetch<'a>(
        &'a self,
        request: &'a Request,
    ) -> LifecycleFuture<'a, Result<Response, String>> {
        Box::pin(async move { self.fetch(request).await.map_err(|err| err.to_string()) })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use shim_host::{CacheStorageFuture, MemoryCacheStorage, MemoryNetwork};

    use super::*;
    use crate::CacheGenerations;

    struct Fixture {
        gateway: CacheGateway,
        caches: MemoryCacheStorage,
        network: MemoryNetwork,
    }

    fn fixture(cached_files: &[&str]) -> Fixture {
        let network = MemoryNetwork::default();
        network
            .route_ok("/a.js", "cached a")
            .route_ok("/b.js", "cached b");
        let caches = MemoryCacheStorage::with_origin(Rc::new(network.clone()));
        let config = GatewayConfig::new(
            CacheGenerations::versioned(["app"], 1),
            cached_files.iter().map(|f| f.to_string()).collect(),
        );
        let gateway = CacheGateway::new(
            Rc::new(caches.clone()),
            Rc::new(network.clone()),
            config,
        )
        .expect("gateway");
        Fixture {
            gateway,
            caches,
            network,
        }
    }

    #[test]
    fn no_store_request_replaces_caller_headers() {
        let original = Request::new("POST", "/submit?draft=1")
            .with_header("Accept", "application/json")
            .with_header("Authorization", "Bearer t")
            .with_body("payload");
        let request = no_store_request(&original);

        assert_eq!(request.url, "/submit?draft=1");
        assert_eq!(request.method, "POST");
        assert_eq!(request.body, b"payload".to_vec());
        assert_eq!(
            request.headers.get("Cache-Control"),
            Some("no-cache, no-store, must-revalidate")
        );
        assert_eq!(request.headers.get("Pragma"), Some("no-cache"));
        assert_eq!(request.headers.get("Expires"), Some("0"));
        assert_eq!(request.headers.get("Accept"), None);
        assert_eq!(request.headers.get("Authorization"), None);
        assert_eq!(request.headers.len(), 3);
    }

    #[test]
    fn install_populates_current_generation() {
        let fx = fixture(&["/a.js", "/b.js"]);
        block_on(fx.gateway.install()).expect("install");
        assert_eq!(fx.caches.cached_urls("app-v1"), vec!["/a.js", "/b.js"]);
    }

    #[test]
    fn install_failure_is_atomic_and_propagated() {
        let fx = fixture(&["/a.js", "/gone.js"]);
        let err = block_on(fx.gateway.install()).expect_err("install fails");
        assert_eq!(
            err,
            GatewayError::Install {
                cache: "app-v1".to_string(),
                reason: "network unreachable: /gone.js".to_string(),
            }
        );
        assert!(fx.caches.cached_urls("app-v1").is_empty());
    }

    #[test]
    fn install_reports_cache_open_failure() {
        let fx = fixture(&["/a.js"]);
        fx.caches.fail_with("quota exceeded");
        let err = block_on(fx.gateway.install()).expect_err("open fails");
        assert_eq!(err.to_string(), "failed to install cache `app-v1`: quota exceeded");
    }

    #[test]
    fn fetch_hit_ignores_query_and_skips_network() {
        let fx = fixture(&["/a.js"]);
        block_on(fx.gateway.install()).expect("install");
        let before = fx.network.request_count();

        let response =
            block_on(fx.gateway.fetch(&Request::get("/a.js?v=123"))).expect("cache hit");
        assert_eq!(response.text(), "cached a");
        assert_eq!(fx.network.request_count(), before);
    }

    #[test]
    fn fetch_miss_goes_to_network_once_without_backfill() {
        let fx = fixture(&[]);
        fx.network
            .route("/api?q=1", Response::new("/api?q=1", 503, "unavailable"));

        let response = block_on(fx.gateway.fetch(&Request::get("/api?q=1"))).expect("miss");
        assert_eq!(response.status, 503);
        assert_eq!(response.text(), "unavailable");

        let sent = fx.network.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "/api?q=1");
        assert_eq!(sent[0].headers.get("Pragma"), Some("no-cache"));
        assert!(fx.caches.cached_urls("app-v1").is_empty());
    }

    #[test]
    fn fetch_miss_sends_only_no_store_headers_and_keeps_body() {
        let fx = fixture(&[]);
        fx.network.route_ok("/form", "accepted");
        let request = Request::new("POST", "/form")
            .with_header("X-Trace", "abc")
            .with_body("a=1");

        let response = block_on(fx.gateway.fetch(&request)).expect("miss");
        assert_eq!(response.text(), "accepted");

        let sent = fx.network.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, "POST");
        assert_eq!(sent[0].body, b"a=1".to_vec());
        assert_eq!(sent[0].headers.get("X-Trace"), None);
        assert_eq!(sent[0].headers.len(), NO_STORE_HEADERS.len());
    }

    #[test]
    fn fetch_miss_propagates_network_failure() {
        let fx = fixture(&[]);
        let err = block_on(fx.gateway.fetch(&Request::get("/offline"))).expect_err("offline");
        assert_eq!(
            err,
            GatewayError::Network("network unreachable: /offline".to_string())
        );
    }

    #[test]
    fn activate_deletes_only_stale_generations() {
        let fx = fixture(&["/a.js"]);
        fx.caches.insert("app-v0", "/a.js", Response::new("/a.js", 200, "old"));
        fx.caches.insert("unrelated", "/x", Response::new("/x", 200, "x"));
        block_on(fx.gateway.install()).expect("install");

        let deleted = block_on(fx.gateway.activate()).expect("activate");
        assert_eq!(deleted, vec!["app-v0", "unrelated"]);
        assert!(fx.caches.contains_cache("app-v1"));
        assert_eq!(fx.caches.cached_urls("app-v1"), vec!["/a.js"]);

        assert_eq!(block_on(fx.gateway.activate()).expect("again"), Vec::<String>::new());
    }

    #[test]
    fn activate_propagates_backend_failure() {
        let fx = fixture(&[]);
        fx.caches.fail_with("caches locked");
        assert_eq!(
            block_on(fx.gateway.activate()).expect_err("activate fails"),
            GatewayError::Backend("caches locked".to_string())
        );
    }

    #[test]
    fn activate_propagates_delete_failure_of_one_stale_cache() {
        let fx = fixture(&["/a.js"]);
        block_on(fx.gateway.install()).expect("install");
        fx.caches.insert("app-v0", "/a.js", Response::new("/a.js", 200, "old"));
        fx.caches.fail_cache("app-v0", "cache locked");

        assert_eq!(
            block_on(fx.gateway.activate()).expect_err("delete fails"),
            GatewayError::Backend("cache locked".to_string())
        );
        assert!(fx.caches.contains_cache("app-v1"));

        fx.caches.recover();
        assert_eq!(block_on(fx.gateway.activate()).expect("retry"), vec!["app-v0"]);
    }

    /// Lists a cache that is already gone by the time it is deleted.
    struct VanishingCaches {
        inner: MemoryCacheStorage,
        vanished: &'static str,
    }

    impl CacheStorage for VanishingCaches {
        fn open<'a>(&'a self, cache_name: &'a str) -> CacheStorageFuture<'a, Result<(), String>> {
            self.inner.open(cache_name)
        }

        fn match_request<'a>(
            &'a self,
            cache_name: &'a str,
            request: &'a Request,
            options: MatchOptions,
        ) -> CacheStorageFuture<'a, Result<Option<Response>, String>> {
            self.inner.match_request(cache_name, request, options)
        }

        fn add_all<'a>(
            &'a self,
            cache_name: &'a str,
            locators: &'a [String],
        ) -> CacheStorageFuture<'a, Result<(), String>> {
            self.inner.add_all(cache_name, locators)
        }

        fn keys<'a>(&'a self) -> CacheStorageFuture<'a, Result<Vec<String>, String>> {
            Box::pin(async move {
                let mut names = self.inner.keys().await?;
                names.push(self.vanished.to_string());
                Ok(names)
            })
        }

        fn delete<'a>(
            &'a self,
            cache_name: &'a str,
        ) -> CacheStorageFuture<'a, Result<bool, String>> {
            self.inner.delete(cache_name)
        }
    }

    #[test]
    fn activate_reports_only_caches_actually_deleted() {
        let inner = MemoryCacheStorage::default();
        inner.insert("app-v0", "/a.js", Response::new("/a.js", 200, "old"));
        let caches = VanishingCaches {
            inner: inner.clone(),
            vanished: "fonts-v0",
        };
        let gateway = CacheGateway::new(
            Rc::new(caches),
            Rc::new(MemoryNetwork::default()),
            GatewayConfig::new(CacheGenerations::versioned(["app"], 1), Vec::new()),
        )
        .expect("gateway");

        assert_eq!(block_on(gateway.activate()).expect("activate"), vec!["app-v0"]);
        assert!(!inner.contains_cache("app-v0"));
    }

    #[test]
    fn handle_dispatches_each_lifecycle_event() {
        let fx = fixture(&["/b.js"]);
        assert_eq!(
            block_on(fx.gateway.handle(LifecycleEvent::Install)).expect("install"),
            LifecycleOutcome::Installed
        );
        assert_eq!(
            block_on(fx.gateway.handle(LifecycleEvent::Activate)).expect("activate"),
            LifecycleOutcome::Activated {
                deleted: Vec::new()
            }
        );
        let outcome = block_on(fx.gateway.handle(LifecycleEvent::Fetch(Request::get("/b.js"))))
            .expect("fetch");
        assert!(matches!(outcome, LifecycleOutcome::Responded(r) if r.text() == "cached b"));
    }

    #[test]
    fn lifecycle_handler_drives_each_phase() {
        let fx = fixture(&["/a.js"]);
        fx.caches.insert("app-v0", "/a.js", Response::new("/a.js", 200, "old"));
        fx.network.route_ok("/upload", "stored");
        let network = fx.network.clone();
        let caches = fx.caches.clone();
        let handler: Rc<dyn LifecycleHandler> = Rc::new(fx.gateway);

        block_on(handler.on_install()).expect("install");
        block_on(handler.on_activate()).expect("activate");
        assert!(!caches.contains_cache("app-v0"));

        let hit = block_on(handler.on_fetch(&Request::get("/a.js?v=9"))).expect("hit");
        assert_eq!(hit.text(), "cached a");

        let upload = Request::new("POST", "/upload").with_body(vec![1, 2, 3]);
        let stored = block_on(handler.on_fetch(&upload)).expect("miss");
        assert_eq!(stored.text(), "stored");
        assert_eq!(network.requests().last().map(|r| r.body.clone()), Some(vec![1, 2, 3]));

        let err = block_on(handler.on_fetch(&Request::get("/offline"))).expect_err("offline");
        assert_eq!(err, "network unreachable: /offline");
    }

    #[test]
    fn lifecycle_handler_reports_install_failure_as_text() {
        let fx = fixture(&["/gone.js"]);
        let err = block_on(fx.gateway.on_install()).expect_err("install fails");
        assert_eq!(
            err,
            "failed to install cache `app-v1`: network unreachable: /gone.js"
        );
    }

    #[test]
    fn new_rejects_config_without_app_generation() {
        let config = GatewayConfig::new(CacheGenerations::versioned(["fonts"], 1), Vec::new());
        let result = CacheGateway::new(
            Rc::new(MemoryCacheStorage::default()),
            Rc::new(MemoryNetwork::default()),
            config,
        );
        assert!(matches!(result, Err(GatewayError::MissingGeneration(name)) if name == "app"));
    }
}
