use shim_host::{MatchOptions, Request, Response};

pub(crate) async fn cache_open(cache_name: &str) -> Result<(), String> {
    super::interop::cache_open(cache_name).await
}

pub(crate) async fn cache_match(
    cache_name: &str,
    request: &Request,
    options: MatchOptions,
) -> Result<Option<Response>, String> {
    super::interop::cache_match(cache_name, request, options).await
}

pub(crate) async fn cache_add_all(cache_name: &str, locators: &[String]) -> Result<(), String> {
    super::interop::cache_add_all(cache_name, locators).await
}

pub(crate) async fn cache_keys() -> Result<Vec<String>, String> {
    super::interop::cache_keys().await
}

pub(crate) async fn cache_delete(cache_name: &str) -> Result<bool, String> {
    super::interop::cache_delete(cache_name).await
}
