//! Named response cache contracts and adapters.

use std::{cell::RefCell, collections::BTreeMap, future::Future, pin::Pin, rc::Rc};

use crate::fetch::{
    network::NetworkFetch,
    request::{strip_query, Request, Response},
};

/// Object-safe boxed future used by [`CacheStorage`] async methods.
pub type CacheStorageFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Lookup options forwarded to [`CacheStorage::match_request`].
pub struct MatchOptions {
    /// Ignore the query string on both the request and the cached entry.
    pub ignore_search: bool,
    /// Match regardless of the request method.
    pub ignore_method: bool,
}

/// Host service managing named caches of request/response pairs.
///
/// Physical caches are addressed by name; `open` creates one when absent.
pub trait CacheStorage {
    /// Opens the cache called `cache_name`, creating it when absent.
    fn open<'a>(&'a self, cache_name: &'a str) -> CacheStorageFuture<'a, Result<(), String>>;

    /// Looks up the response cached for `request` in `cache_name`.
    fn match_request<'a>(
        &'a self,
        cache_name: &'a str,
        request: &'a Request,
        options: MatchOptions,
    ) -> CacheStorageFuture<'a, Result<Option<Response>, String>>;

    /// Fetches every locator and stores all responses in `cache_name`.
    ///
    /// Either every locator is stored or none is.
    fn add_all<'a>(
        &'a self,
        cache_name: &'a str,
        locators: &'a [String],
    ) -> CacheStorageFuture<'a, Result<(), String>>;

    /// Lists the names of every existing cache.
    fn keys<'a>(&'a self) -> CacheStorageFuture<'a, Result<Vec<String>, String>>;

    /// Deletes `cache_name`, returning whether it existed.
    fn delete<'a>(&'a self, cache_name: &'a str) -> CacheStorageFuture<'a, Result<bool, String>>;
}

type CacheEntries = BTreeMap<String, Response>;

#[derive(Clone, Default)]
/// In-memory cache storage keyed by cache name, then by request URL.
///
/// `add_all` pulls resources through the configured origin network. A failure switch makes every
/// operation reject, mirroring a broken backend.
pub struct MemoryCacheStorage {
    caches: Rc<RefCell<BTreeMap<String, CacheEntries>>>,
    origin: Option<Rc<dyn NetworkFetch>>,
    failure: Rc<RefCell<Option<String>>>,
    cache_failures: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryCacheStorage {
    /// Creates cache storage whose `add_all` fetches through `origin`.
    pub fn with_origin(origin: Rc<dyn NetworkFetch>) -> Self {
        Self {
            origin: Some(origin),
            ..Self::default()
        }
    }

    /// Stores `response` under `url` in `cache_name`, creating the cache when absent.
    pub fn insert(&self, cache_name: &str, url: &str, response: Response) {
        self.caches
            .borrow_mut()
            .entry(cache_name.to_string())
            .or_default()
            .insert(url.to_string(), response);
    }

    /// Returns whether `cache_name` exists.
    pub fn contains_cache(&self, cache_name: &str) -> bool {
        self.caches.borrow().contains_key(cache_name)
    }

    /// Returns the URLs stored in `cache_name`, or an empty list when it does not exist.
    pub fn cached_urls(&self, cache_name: &str) -> Vec<String> {
        self.caches
            .borrow()
            .get(cache_name)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Makes every subsequent operation fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.borrow_mut() = Some(message.into());
    }

    /// Makes every subsequent operation naming `cache_name` fail with `message`.
    ///
    /// Listing caches is unaffected.
    pub fn fail_cache(&self, cache_name: impl Into<String>, message: impl Into<String>) {
        self.cache_failures
            .borrow_mut()
            .insert(cache_name.into(), message.into());
    }

    /// Clears failures installed by [`Self::fail_with`] and [`Self::fail_cache`].
    pub fn recover(&self) {
        *self.failure.borrow_mut() = None;
        self.cache_failures.borrow_mut().clear();
    }

    fn check(&self) -> Result<(), String> {
        match self.failure.borrow().as_ref() {
            Some(message) => Err(message.clone()),
            None => Ok(()),
        }
    }

    fn check_cache(&self, cache_name: &str) -> Result<(), String> {
        self.check()?;
        match self.cache_failures.borrow().get(cache_name) {
            Some(message) => Err(message.clone()),
            None => Ok(()),
        }
    }
}

fn entry_matches(cached_url: &str, request: &Request, options: MatchOptions) -> bool {
    if options.ignore_search {
        strip_query(cached_url) == strip_query(&request.url)
    } else {
        cached_url == request.url
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn open<'a>(&'a self, cache_name: &'a str) -> CacheStorageFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.check_cache(cache_name)?;
            self.caches
                .borrow_mut()
                .entry(cache_name.to_string())
                .or_default();
            Ok(())
        })
    }

    fn match_request<'a>(
        &'a self,
        cache_name: &'a str,
        request: &'a Request,
        options: MatchOptions,
    ) -> CacheStorageFuture<'a, Result<Option<Response>, String>> {
        Box::pin(async move {
            self.check_cache(cache_name)?;
            if !options.ignore_method && !request.method.eq_ignore_ascii_case("GET") {
                return Ok(None);
            }
            let caches = self.caches.borrow();
            let Some(entries) = caches.get(cache_name) else {
                return Ok(None);
            };
            Ok(entries
                .iter()
                .find(|(url, _)| entry_matches(url, request, options))
                .map(|(_, response)| response.clone()))
        })
    }

    fn add_all<'a>(
        &'a self,
        cache_name: &'a str,
        locators: &'a [String],
    ) -> CacheStorageFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.check_cache(cache_name)?;
            let origin = self
                .origin
                .as_ref()
                .ok_or_else(|| "no origin network configured for add_all".to_string())?;

            let mut fetched = Vec::with_capacity(locators.len());
            for locator in locators {
                let response = origin.fetch(&Request::get(locator.as_str())).await?;
                if !response.is_ok() {
                    return Err(format!(
                        "unexpected status {} while caching {locator}",
                        response.status
                    ));
                }
                fetched.push((locator.clone(), response));
            }

            let mut caches = self.caches.borrow_mut();
            let entries = caches.entry(cache_name.to_string()).or_default();
            entries.extend(fetched);
            Ok(())
        })
    }

    fn keys<'a>(&'a self) -> CacheStorageFuture<'a, Result<Vec<String>, String>> {
        Box::pin(async move {
            self.check()?;
            Ok(self.caches.borrow().keys().cloned().collect())
        })
    }

    fn delete<'a>(&'a self, cache_name: &'a str) -> CacheStorageFuture<'a, Result<bool, String>> {
        Box::pin(async move {
            self.check_cache(cache_name)?;
            Ok(self.caches.borrow_mut().remove(cache_name).is_some())
        })
    }
}
