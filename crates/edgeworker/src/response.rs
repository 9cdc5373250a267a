use std::fmt;

use bytes::Bytes;

use crate::blob::Blob;
use crate::body::{Body, HostBody};
use crate::bridge::{HostBridge, NativeResponseRef, ResponseInit};
use crate::error::HostError;
use crate::form::FormData;
use crate::header::Headers;

/// A read-only view over a host-native response.
///
/// Obtained from [`ResponseSpec::build()`] or from a fetch. Like
/// [`Request`](crate::Request), the body readers consume the native stream.
#[derive(Clone)]
pub struct Response {
    native: NativeResponseRef,
}

impl Response {
    pub fn from_native(native: NativeResponseRef) -> Self {
        Self { native }
    }

    /// Build a native response through the host. See [`ResponseSpec`].
    pub fn create(host: &dyn HostBridge, spec: ResponseSpec) -> Result<Self, HostError> {
        spec.build(host)
    }

    pub fn as_native(&self) -> &NativeResponseRef {
        &self.native
    }

    pub fn into_native(self) -> NativeResponseRef {
        self.native
    }

    pub fn status(&self) -> u16 {
        self.native.status()
    }

    pub fn status_text(&self) -> &str {
        self.native.status_text()
    }

    /// `true` for a 2xx status.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status())
    }

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

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.native.status())
            .field("status_text", &self.native.status_text())
            .finish_non_exhaustive()
    }
}

impl From<NativeResponseRef> for Response {
    fn from(native: NativeResponseRef) -> Self {
        Self::from_native(native)
    }
}

/// Description of an outbound response, turned into a native response by
/// [`build()`](ResponseSpec::build).
///
/// All fields are optional and default to `None`:
///
/// | field         | when `None`                                   |
/// |---------------|-----------------------------------------------|
/// | `body`        | empty body                                    |
/// | `status`      | host default, conventionally 200              |
/// | `status_text` | host default, conventionally empty            |
/// | `headers`     | no headers beyond what the host derives       |
///
/// Nothing is validated here. Out-of-range statuses or illegal header
/// names are passed to the host, which may reject them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseSpec {
    pub body: Option<Body>,
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub headers: Option<Headers>,
}

impl ResponseSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = Some(status_text.into());
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

    /// Construct the native response. Host rejections are returned unchanged.
    pub fn build(self, host: &dyn HostBridge) -> Result<Response, HostError> {
        let body = self.body.map(HostBody::from);
        let init = ResponseInit {
            status: self.status,
            status_text: self.status_text,
            headers: self.headers,
        };
        tracing::debug!(status = ?init.status, "constructing response");
        host.new_response(body, init).map(Response::from_native)
    }
}

/// What a handler produces: a response to build, or one that already exists.
#[derive(Debug, Clone)]
pub enum Reply {
    Spec(ResponseSpec),
    Response(Response),
}

impl Reply {
    /// Resolve to a native-backed response, building specs through `host`.
    pub fn into_response(self, host: &dyn HostBridge) -> Result<Response, HostError> {
        match self {
            Reply::Spec(spec) => spec.build(host),
            Reply::Response(response) => Ok(response),
        }
    }
}

impl From<ResponseSpec> for Reply {
    fn from(spec: ResponseSpec) -> Self {
        Reply::Spec(spec)
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Response(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::body::OCTET_STREAM;
    use crate::fake::FakeHost;

    #[tokio::test]
    async fn empty_spec_uses_host_defaults() {
        let host = FakeHost::new();
        let resp = ResponseSpec::new().build(&*host).unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.status_text(), "");
        assert!(resp.headers().is_empty());
        assert_eq!(resp.body().await.unwrap(), "");
    }

    #[tokio::test]
    async fn byte_body_reads_back_with_octet_stream_type() {
        let host = FakeHost::new();
        let resp = Response::create(
            &*host,
            ResponseSpec::new().body(vec![0x01u8, 0x02, 0x03]),
        )
        .unwrap();

        assert_eq!(resp.headers().get("content-type"), Some(OCTET_STREAM));
        assert_eq!(resp.raw_body().await.unwrap().as_ref(), &[0x01, 0x02, 0x03]);
    }

    #[tokio::test]
    async fn explicit_options_reach_the_host() {
        let host = FakeHost::new();
        let resp = ResponseSpec::new()
            .body("created")
            .status(201)
            .status_text("Created")
            .header("Location", "/items/9")
            .build(&*host)
            .unwrap();

        assert_eq!(resp.status(), 201);
        assert_eq!(resp.status_text(), "Created");
        assert!(resp.ok());
        assert_eq!(resp.headers().get("Location"), Some("/items/9"));
        assert_eq!(resp.body().await.unwrap(), "created");
    }

    #[test]
    fn host_rejection_is_returned_unchanged() {
        let host = FakeHost::new();
        let err = ResponseSpec::new().status(42).build(&*host).unwrap_err();
        assert!(matches!(err, HostError::Construction(_)));
    }

    #[tokio::test]
    async fn form_body_round_trips_through_host() {
        let host = FakeHost::new();
        let form: FormData = [("a", "1"), ("b", "two words")].into_iter().collect();
        let resp = ResponseSpec::new().body(form.clone()).build(&*host).unwrap();

        assert_eq!(resp.form_data().await.unwrap(), form);
    }

    #[test]
    fn reply_passes_existing_response_through() {
        let host = FakeHost::new();
        let built = ResponseSpec::new().status(404).build(&*host).unwrap();
        let native = Arc::clone(built.as_native());

        let resolved = Reply::from(built).into_response(&*host).unwrap();
        assert!(Arc::ptr_eq(resolved.as_native(), &native));
        assert!(!resolved.ok());
    }
}
