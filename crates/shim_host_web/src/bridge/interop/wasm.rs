use std::{cell::RefCell, collections::HashMap, rc::Rc};

use js_sys::{Array, Object, Promise, Uint8Array};
use shim_host::{Headers, LifecycleFuture};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{
    CacheQueryOptions, ExtendableEvent, FetchEvent, ServiceWorkerGlobalScope, Window,
    WorkerGlobalScope,
};

use super::*;

thread_local! {
    static OPEN_NOTIFICATIONS: RefCell<HashMap<String, web_sys::Notification>> =
        RefCell::new(HashMap::new());
}

enum GlobalScope {
    Window(Window),
    Worker(WorkerGlobalScope),
}

fn js_error(context: &str, err: JsValue) -> String {
    format!("{context}: {err:?}")
}

fn global_scope() -> Result<GlobalScope, String> {
    let global = js_sys::global();
    if let Some(worker) = global.dyn_ref::<WorkerGlobalScope>() {
        return Ok(GlobalScope::Worker(worker.clone()));
    }
    global
        .dyn_into::<Window>()
        .map(GlobalScope::Window)
        .map_err(|_| "no window or worker global scope".to_string())
}

fn cache_storage() -> Result<web_sys::CacheStorage, String> {
    match global_scope()? {
        GlobalScope::Window(window) => window.caches(),
        GlobalScope::Worker(worker) => worker.caches(),
    }
    .map_err(|e| js_error("Cache API unavailable", e))
}

async fn open_cache(cache_name: &str) -> Result<web_sys::Cache, String> {
    let opened = JsFuture::from(cache_storage()?.open(cache_name))
        .await
        .map_err(|e| js_error("caches.open failed", e))?;
    opened
        .dyn_into::<web_sys::Cache>()
        .map_err(|e| js_error("caches.open returned a non-cache value", e))
}

fn to_js_request(request: &Request) -> Result<web_sys::Request, String> {
    let headers = web_sys::Headers::new().map_err(|e| js_error("Headers unavailable", e))?;
    for (name, value) in request.headers.iter() {
        headers
            .set(name, value)
            .map_err(|e| js_error("invalid request header", e))?;
    }

    let init = web_sys::RequestInit::new();
    init.set_method(&request.method);
    init.set_headers(&headers);
    if !request.body.is_empty() {
        init.set_body(&Uint8Array::from(request.body.as_slice()));
    }
    web_sys::Request::new_with_str_and_init(&request.url, &init)
        .map_err(|e| js_error("invalid request", e))
}

fn read_headers(source: &web_sys::Headers) -> Result<Headers, String> {
    let mut headers = Headers::default();
    if let Some(entries) =
        js_sys::try_iter(source).map_err(|e| js_error("headers unreadable", e))?
    {
        for entry in entries {
            let pair = entry
                .map_err(|e| js_error("headers unreadable", e))?
                .unchecked_into::<Array>();
            headers.set(
                pair.get(0).as_string().unwrap_or_default(),
                pair.get(1).as_string().unwrap_or_default(),
            );
        }
    }
    Ok(headers)
}

async fn read_body(pending: Result<Promise, JsValue>) -> Result<Vec<u8>, String> {
    let pending = pending.map_err(|e| js_error("body unreadable", e))?;
    let buffer = JsFuture::from(pending)
        .await
        .map_err(|e| js_error("body unreadable", e))?;
    Ok(Uint8Array::new(&buffer).to_vec())
}

async fn from_js_request(request: web_sys::Request) -> Result<Request, String> {
    let method = request.method();
    let body = if method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("HEAD") {
        Vec::new()
    } else {
        read_body(request.array_buffer()).await?
    };
    Ok(Request {
        url: request.url(),
        headers: read_headers(&request.headers())?,
        method,
        body,
    })
}

async fn from_js_response(response: web_sys::Response) -> Result<Response, String> {
    Ok(Response {
        url: response.url(),
        status: response.status(),
        headers: read_headers(&response.headers())?,
        body: read_body(response.array_buffer()).await?,
    })
}

fn to_js_response(response: &Response) -> Result<web_sys::Response, String> {
    let headers = web_sys::Headers::new().map_err(|e| js_error("Headers unavailable", e))?;
    for (name, value) in response.headers.iter() {
        headers
            .set(name, value)
            .map_err(|e| js_error("invalid response header", e))?;
    }

    let init = web_sys::ResponseInit::new();
    init.set_status(response.status);
    init.set_headers(&headers);
    let body = (!response.body.is_empty())
        .then(|| Object::from(Uint8Array::from(response.body.as_slice())));
    web_sys::Response::new_with_opt_buffer_source_and_init(body.as_ref(), &init)
        .map_err(|e| js_error("invalid response", e))
}

pub async fn cache_open(cache_name: &str) -> Result<(), String> {
    open_cache(cache_name).await.map(|_| ())
}

pub async fn cache_match(
    cache_name: &str,
    request: &Request,
    options: MatchOptions,
) -> Result<Option<Response>, String> {
    let cache = open_cache(cache_name).await?;
    let js_request = to_js_request(request)?;
    let query = CacheQueryOptions::new();
    query.set_ignore_search(options.ignore_search);
    query.set_ignore_method(options.ignore_method);

    let matched = JsFuture::from(cache.match_with_request_and_options(&js_request, &query))
        .await
        .map_err(|e| js_error("cache.match failed", e))?;
    if matched.is_undefined() {
        return Ok(None);
    }
    let response = matched
        .dyn_into::<web_sys::Response>()
        .map_err(|e| js_error("cache.match returned a non-response value", e))?;
    from_js_response(response).await.map(Some)
}

pub async fn cache_add_all(cache_name: &str, locators: &[String]) -> Result<(), String> {
    let cache = open_cache(cache_name).await?;
    let urls: Array = locators
        .iter()
        .map(|locator| JsValue::from_str(locator))
        .collect();
    JsFuture::from(cache.add_all_with_str_sequence(&urls))
        .await
        .map(|_| ())
        .map_err(|e| js_error("cache.addAll failed", e))
}

pub async fn cache_keys() -> Result<Vec<String>, String> {
    let names = JsFuture::from(cache_storage()?.keys())
        .await
        .map_err(|e| js_error("caches.keys failed", e))?
        .dyn_into::<Array>()
        .map_err(|e| js_error("caches.keys returned a non-array value", e))?;
    Ok(names.iter().filter_map(|name| name.as_string()).collect())
}

pub async fn cache_delete(cache_name: &str) -> Result<bool, String> {
    let deleted = JsFuture::from(cache_storage()?.delete(cache_name))
        .await
        .map_err(|e| js_error("caches.delete failed", e))?;
    Ok(deleted.as_bool().unwrap_or(false))
}

pub async fn network_fetch(request: &Request) -> Result<Response, String> {
    let js_request = to_js_request(request)?;
    let pending = match global_scope()? {
        GlobalScope::Window(window) => window.fetch_with_request(&js_request),
        GlobalScope::Worker(worker) => worker.fetch_with_request(&js_request),
    };
    let response = JsFuture::from(pending)
        .await
        .map_err(|e| js_error("fetch failed", e))?
        .dyn_into::<web_sys::Response>()
        .map_err(|e| js_error("fetch returned a non-response value", e))?;
    from_js_response(response).await
}

pub async fn notification_show(request: &NotificationRequest) -> Result<(), String> {
    let options = web_sys::NotificationOptions::new();
    options.set_body(&request.body);
    options.set_tag(&request.tag);
    if let Some(icon_url) = &request.icon_url {
        options.set_icon(icon_url);
    }
    let notification = web_sys::Notification::new_with_options(&request.title, &options)
        .map_err(|e| js_error("notification dispatch failed", e))?;

    let replaced = OPEN_NOTIFICATIONS
        .with(|open| open.borrow_mut().insert(request.tag.clone(), notification));
    if let Some(replaced) = replaced {
        replaced.close();
    }
    Ok(())
}

pub async fn notification_close(tag: &str) -> Result<(), String> {
    if let Some(notification) = OPEN_NOTIFICATIONS.with(|open| open.borrow_mut().remove(tag)) {
        notification.close();
    }
    Ok(())
}

pub async fn notification_permission() -> NotificationPermission {
    match web_sys::Notification::permission() {
        web_sys::NotificationPermission::Granted => NotificationPermission::Granted,
        _ => NotificationPermission::Denied,
    }
}

fn install_phase(handler: &dyn LifecycleHandler) -> LifecycleFuture<'_, Result<(), String>> {
    handler.on_install()
}

fn activate_phase(handler: &dyn LifecycleHandler) -> LifecycleFuture<'_, Result<(), String>> {
    handler.on_activate()
}

fn listen_extendable(
    scope: &ServiceWorkerGlobalScope,
    event_name: &str,
    handler: &Rc<dyn LifecycleHandler>,
    phase: fn(&dyn LifecycleHandler) -> LifecycleFuture<'_, Result<(), String>>,
) -> Result<(), String> {
    let handler = Rc::clone(handler);
    let on_event = Closure::<dyn FnMut(ExtendableEvent)>::wrap(Box::new(
        move |event: ExtendableEvent| {
            let handler = Rc::clone(&handler);
            let promise = future_to_promise(async move {
                phase(handler.as_ref())
                    .await
                    .map(|()| JsValue::UNDEFINED)
                    .map_err(|err| JsValue::from_str(&err))
            });
            let _ = event.wait_until(&promise);
        },
    ));
    scope
        .add_event_listener_with_callback(event_name, on_event.as_ref().unchecked_ref())
        .map_err(|e| js_error("lifecycle listener registration failed", e))?;
    on_event.forget();
    Ok(())
}

pub fn register_lifecycle(handler: Rc<dyn LifecycleHandler>) -> Result<(), String> {
    let scope = js_sys::global()
        .dyn_into::<ServiceWorkerGlobalScope>()
        .map_err(|_| "lifecycle events require a service worker global scope".to_string())?;

    listen_extendable(&scope, "install", &handler, install_phase)?;
    listen_extendable(&scope, "activate", &handler, activate_phase)?;

    let on_fetch = Closure::<dyn FnMut(FetchEvent)>::wrap(Box::new(move |event: FetchEvent| {
        let handler = Rc::clone(&handler);
        let request = event.request();
        let promise = future_to_promise(async move {
            let request = from_js_request(request)
                .await
                .map_err(|err| JsValue::from_str(&err))?;
            let response = handler
                .on_fetch(&request)
                .await
                .map_err(|err| JsValue::from_str(&err))?;
            to_js_response(&response)
                .map(JsValue::from)
                .map_err(|err| JsValue::from_str(&err))
        });
        let _ = event.respond_with(&promise);
    }));
    scope
        .add_event_listener_with_callback("fetch", on_fetch.as_ref().unchecked_ref())
        .map_err(|e| js_error("lifecycle listener registration failed", e))?;
    on_fetch.forget();
    Ok(())
}
