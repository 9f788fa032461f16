//! `fetch`-backed live network implementation.

use shim_host::{NetworkFetch, NetworkFuture, Request, Response};

#[derive(Debug, Clone, Copy, Default)]
/// Browser network adapter backed by the global `fetch` function.
pub struct WebNetwork;

impl NetworkFetch for WebNetwork {
    fn fetch<'a>(&'a self, request: &'a Request) -> NetworkFuture<'a, Result<Response, String>> {
        Box::pin(async move { crate::bridge::network_fetch(request).await })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_network_adapter_reports_unsupported() {
        let err = block_on(WebNetwork.fetch(&Request::get("/index.html"))).expect_err("fetch");
        assert_eq!(
            err,
            "Browser network and storage APIs are only available when compiled for wasm32"
        );
    }
}
