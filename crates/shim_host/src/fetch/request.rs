//! Request and response models shared by the cache backend and network contracts.

use serde::{Deserialize, Serialize};

/// Returns `url` with any query string removed.
///
/// Everything from the first `?` onward is dropped; URLs without a query are returned as-is.
pub fn strip_query(url: &str) -> &str {
    match url.find('?') {
        Some(index) => &url[..index],
        None => url,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
/// Ordered header list with case-insensitive lookup.
pub struct Headers(Vec<(String, String)>);

impl Headers {
    /// Returns the first value stored under `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Replaces every value stored under `name` with a single `value`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.0.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        self.0.push((name, value.into()));
    }

    /// Iterates `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the number of stored header pairs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no headers are stored.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn default_method() -> String {
    "GET".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Outbound request as seen by the fetch interception layer.
pub struct Request {
    /// Absolute or scope-relative URL, possibly carrying a query string.
    pub url: String,
    /// HTTP method, `GET` unless stated otherwise.
    #[serde(default = "default_method")]
    pub method: String,
    /// Request headers.
    #[serde(default)]
    pub headers: Headers,
    /// Raw request body; empty for bodiless methods.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<u8>,
}

impl Request {
    /// Builds a request for `url` with no headers and no body.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            headers: Headers::default(),
            body: Vec::new(),
        }
    }

    /// Builds a `GET` request for `url` with no headers.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(default_method(), url)
    }

    /// Returns this request carrying `body`.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns this request with `name` set to `value`.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Returns whether the URL carries a query string.
    pub fn has_query(&self) -> bool {
        self.url.contains('?')
    }

    /// Returns a copy of this request whose URL has the query string removed.
    ///
    /// Method, headers and body are preserved.
    pub fn without_query(&self) -> Self {
        Self {
            url: strip_query(&self.url).to_string(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Response returned by the cache backend or the network.
pub struct Response {
    /// URL the response was produced for.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    #[serde(default)]
    pub headers: Headers,
    /// Raw response body.
    #[serde(default)]
    pub body: Vec<u8>,
}

impl Response {
    /// Builds a response with no headers.
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status,
            headers: Headers::default(),
            body: body.into(),
        }
    }

    /// Returns whether the status is in the `2xx` range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_query_drops_everything_after_first_question_mark() {
        assert_eq!(strip_query("/app.js?v=2&x=1"), "/app.js");
        assert_eq!(strip_query("/a?b?c"), "/a");
        assert_eq!(strip_query("/plain.css"), "/plain.css");
        assert_eq!(strip_query("/trailing?"), "/trailing");
    }

    #[test]
    fn without_query_keeps_method_headers_and_body() {
        let request = Request::new("POST", "https://app.example/form?utm=1")
            .with_header("Accept", "text/html")
            .with_body("a=1");

        let normalized = request.without_query();
        assert_eq!(normalized.url, "https://app.example/form");
        assert_eq!(normalized.method, "POST");
        assert_eq!(normalized.body, b"a=1".to_vec());
        assert_eq!(normalized.headers.get("accept"), Some("text/html"));
        assert!(request.has_query());
        assert!(!normalized.has_query());
    }

    #[test]
    fn body_is_omitted_from_json_when_empty() {
        let raw = serde_json::to_string(&Request::get("/a")).expect("serialize");
        assert_eq!(raw, r#"{"url":"/a","method":"GET","headers":[]}"#);
        let parsed: Request = serde_json::from_str(r#"{"url":"/a"}"#).expect("deserialize");
        assert_eq!(parsed, Request::get("/a"));
    }

    #[test]
    fn headers_set_replaces_case_insensitively() {
        let mut headers = Headers::default();
        headers.set("cache-control", "max-age=60");
        headers.set("Cache-Control", "no-cache");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CACHE-CONTROL"), Some("no-cache"));
    }

    #[test]
    fn response_status_classification() {
        assert!(Response::new("/a", 200, "ok").is_ok());
        assert!(Response::new("/a", 204, Vec::new()).is_ok());
        assert!(!Response::new("/a", 304, Vec::new()).is_ok());
        assert!(!Response::new("/a", 500, "boom").is_ok());
        assert_eq!(Response::new("/a", 200, "héllo").text(), "héllo");
    }
}
