use std::fmt;

use bytes::Bytes;
use http::Uri;

use crate::blob::Blob;
use crate::body::{Body, HostBody};
use crate::bridge::{HostBridge, NativeRequestRef, RequestInit};
use crate::error::{HostError, Result};
use crate::form::{self, FormData};
use crate::header::Headers;
use crate::method::HttpMethod;

/// A read-only view over a host-native request.
///
/// Cloning shares the same native handle. The body readers consume the
/// native body stream: each may be called once per native request, and a
/// repeated read reports whatever error the host raises.
#[derive(Clone)]
pub struct Request {
    native: NativeRequestRef,
}

impl Request {
    pub fn from_native(native: NativeRequestRef) -> Self {
        Self { native }
    }

    /// Build a native request through the host. See [`RequestSpec`].
    pub fn create(host: &dyn HostBridge, spec: RequestSpec) -> Result<Self, HostError> {
        spec.build(host)
    }

    pub fn as_native(&self) -> &NativeRequestRef {
        &self.native
    }

    pub fn into_native(self) -> NativeRequestRef {
        self.native
    }

    pub fn method(&self) -> Result<HttpMethod> {
        self.native.method().parse()
    }

    pub fn url(&self) -> &str {
        self.native.url()
    }

    /// The path component of the URL, without query or fragment.
    pub fn path(&self) -> String {
        let url = self.native.url();
        match url.parse::<Uri>() {
            Ok(uri) => uri.path().to_string(),
            Err(_) => raw_path(url).to_string(),
        }
    }

    /// Non-empty `/`-separated segments of [`path()`](Request::path).
    pub fn path_segments(&self) -> Vec<String> {
        path_segments(&self.path())
    }

    /// Decoded query parameters, in order of appearance.
    pub fn query(&self) -> Vec<(String, String)> {
        let url = self.native.url();
        let query = match url.parse::<Uri>() {
            Ok(uri) => uri.query().map(str::to_string),
            Err(_) => url
                .split('#')
                .next()
                .and_then(|u| u.split_once('?'))
                .map(|(_, q)| q.to_string()),
        };
        query.map(|q| form::parse_pairs(&q)).unwrap_or_default()
    }

    /// Enumerate the native headers. Each call re-reads the host state.
    pub fn headers(&self) -> Headers {
        self.native.header_entries().into_iter().collect()
    }

    /// Read the body as text.
    pub async fn body(&self) -> Result<String, HostError> {
        self.native.text().await
    }

    /// Read the body as raw bytes.
    pub async fn raw_body(&self) -> Result<Bytes, HostError> {
        self.native.array_buffer().await
    }

    pub async fn blob(&self) -> Result<Blob, HostError> {
        self.native.blob().await
    }

    pub async fn form_data(&self) -> Result<FormData, HostError> {
        self.native.form_data().await
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.native.method())
            .field("url", &self.native.url())
            .finish_non_exhaustive()
    }
}

impl From<NativeRequestRef> for Request {
    fn from(native: NativeRequestRef) -> Self {
        Self::from_native(native)
    }
}

/// Split a path on `/`, dropping empty segments.
///
/// `/a//b/` yields `["a", "b"]`; `/` and the empty path yield nothing.
pub fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or_default()
}

/// Path of a URL `http::Uri` refused, found by dropping any
/// `scheme://authority` prefix and the query.
fn raw_path(url: &str) -> &str {
    let Some((scheme, rest)) = url.split_once("://") else {
        return strip_query(url);
    };
    let is_scheme = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !is_scheme {
        return strip_query(url);
    }
    match rest.find(['/', '?', '#']) {
        Some(at) if rest[at..].starts_with('/') => strip_query(&rest[at..]),
        _ => "/",
    }
}

/// Description of an outbound request, turned into a native request by
/// [`build()`](RequestSpec::build).
///
/// Every optional field left as `None` is omitted from the host call, so
/// the host default applies (method `GET`, no body, no headers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub url: String,
    pub method: Option<HttpMethod>,
    pub body: Option<Body>,
    pub headers: Option<Headers>,
}

impl RequestSpec {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: None,
            body: None,
            headers: None,
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn headers(mut self, headers: impl Into<Headers>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    /// Add a single header, creating the header set if needed.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name, value);
        self
    }

    /// Construct the native request. Host rejections are returned unchanged.
    pub fn build(self, host: &dyn HostBridge) -> Result<Request, HostError> {
        let body = self.body.map(HostBody::from);
        let init = RequestInit {
            method: self.method,
            headers: self.headers,
        };
        tracing::debug!(url = %self.url, method = ?init.method, "constructing request");
        host.new_request(&self.url, body, init).map(Request::from_native)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fake::FakeRequest;

    fn view(url: &str) -> Request {
        Request::from_native(Arc::new(FakeRequest::new("GET", url)))
    }

    #[test]
    fn path_segments_drop_empty_parts() {
        assert_eq!(path_segments("/a//b/"), vec!["a", "b"]);
        assert!(path_segments("/").is_empty());
        assert!(path_segments("").is_empty());
    }

    #[test]
    fn path_comes_from_absolute_url() {
        let req = view("https://example.com/users/42?page=1");
        assert_eq!(req.url(), "https://example.com/users/42?page=1");
        assert_eq!(req.path(), "/users/42");
        assert_eq!(req.path_segments(), vec!["users", "42"]);
    }

    #[test]
    fn path_of_bare_origin_is_root() {
        assert_eq!(view("https://example.com").path(), "/");
        assert!(view("https://example.com").path_segments().is_empty());
    }

    #[test]
    fn path_falls_back_for_unparseable_urls() {
        assert_eq!(view("/docs/intro#setup").path(), "/docs/intro");
        assert_eq!(view("").path(), "");
    }

    #[test]
    fn path_of_unparseable_absolute_url_drops_the_origin() {
        let req = view("https://example.com/café menu/today?lang=fr");
        assert_eq!(req.path(), "/café menu/today");
        assert_eq!(req.path_segments(), vec!["café menu", "today"]);

        assert_eq!(view("https://ex ample.com").path(), "/");
        assert_eq!(view("https://ex ample.com?q=1").path(), "/");
        assert_eq!(view("/a b/c?d").path(), "/a b/c");
    }

    #[test]
    fn query_pairs_are_decoded_in_order() {
        let req = view("https://example.com/search?q=rust+lang&tag=a&tag=b");
        assert_eq!(
            req.query(),
            vec![
                ("q".to_string(), "rust lang".to_string()),
                ("tag".to_string(), "a".to_string()),
                ("tag".to_string(), "b".to_string()),
            ]
        );
        assert!(view("https://example.com/").query().is_empty());
    }

    #[test]
    fn method_parses_native_verb() {
        assert_eq!(view("https://example.com/").method().unwrap(), HttpMethod::Get);

        let head = Request::from_native(Arc::new(FakeRequest::new("HEAD", "https://example.com/")));
        assert!(head.method().is_err());
    }

    #[test]
    fn spec_builder_collects_headers() {
        let spec = RequestSpec::new("https://api.example.com/")
            .method(HttpMethod::Post)
            .header("Accept", "application/json")
            .header("X-Id", "7");

        assert_eq!(spec.method, Some(HttpMethod::Post));
        let headers = spec.headers.unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("X-Id"), Some("7"));
    }

    #[test]
    fn debug_shows_method_and_url() {
        let rendered = format!("{:?}", view("https://example.com/"));
        assert!(rendered.contains("GET"));
        assert!(rendered.contains("https://example.com/"));
    }
}
