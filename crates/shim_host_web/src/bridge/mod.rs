//! Browser capability bridge implementations for `shim_host_web` service adapters.
//!
//! This module is organized by host domain (`cache`, `lifecycle`, `network`, `notify`) and re-exports a flat
//! crate-internal API for the adapters.

mod cache;
mod interop;
mod lifecycle;
mod network;
mod notify;

pub(crate) use cache::{cache_add_all, cache_delete, cache_keys, cache_match, cache_open};
pub(crate) use lifecycle::register_lifecycle;
pub(crate) use network::network_fetch;
pub(crate) use notify::{notification_close, notification_permission, notification_show};

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use futures::executor::block_on;
    use shim_host::{
        LifecycleFuture, LifecycleHandler, MatchOptions, NotificationPermission,
        NotificationRequest, Request, Response,
    };

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn cache_public_api_non_wasm_parity() {
        block_on(cache_open("app-v1")).expect("open");
        block_on(cache_add_all("app-v1", &["/a.js".to_string()])).expect("add all");
        assert_eq!(
            block_on(cache_match("app-v1", &Request::get("/a.js"), MatchOptions::default()))
                .expect("match"),
            None
        );
        assert!(block_on(cache_keys()).expect("keys").is_empty());
        assert!(!block_on(cache_delete("app-v1")).expect("delete"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn network_public_api_non_wasm_parity() {
        let expected =
            "Browser network and storage APIs are only available when compiled for wasm32"
                .to_string();
        assert_eq!(
            block_on(network_fetch(&Request::get("/a.js"))).expect_err("fetch should fail"),
            expected
        );
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn notification_public_api_non_wasm_parity() {
        let request = NotificationRequest {
            tag: "t".to_string(),
            title: "Title".to_string(),
            body: "Body".to_string(),
            icon_url: Some("/icon.png".to_string()),
        };
        block_on(notification_show(&request)).expect("show");
        block_on(notification_close("t")).expect("close");
        assert_eq!(
            block_on(notification_permission()),
            NotificationPermission::Denied
        );
    }

    struct Unreachable;

    impl LifecycleHandler for Unreachable {
        fn on_install<'a>(&'a self) -> LifecycleFuture<'a, Result<(), String>> {
            Box::pin(async { Err("install must not run".to_string()) })
        }

        fn on_activate<'a>(&'a self) -> LifecycleFuture<'a, Result<(), String>> {
            Box::pin(async { Err("activate must not run".to_string()) })
        }

        fn on_fetch<'a>(
            &'a self,
            _request: &'a Request,
        ) -> LifecycleFuture<'a, Result<Response, String>> {
            Box::pin(async { Err("fetch must not run".to_string()) })
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn lifecycle_public_api_non_wasm_parity() {
        register_lifecycle(Rc::new(Unreachable)).expect("register");
    }
}
