//! The host bridge.
//!
//! Everything this crate needs from the edge host goes through the traits
//! in this module: the event subscription, the native request and response
//! handles, their constructors, and the fetch primitive. Production code
//! depends only on these traits, so an in-memory host such as
//! [`FakeHost`](crate::fake::FakeHost) can stand in for the real runtime.
//!
//! ```text
//! host event ──► Listener ──► FetchEvent::request()
//!                               │
//!                     registered handler
//!                               │
//!   FetchEvent::respond_with / respond_with_deferred ◄──┘
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;

use crate::blob::Blob;
use crate::body::HostBody;
use crate::error::HostError;
use crate::form::FormData;
use crate::header::Headers;
use crate::method::HttpMethod;

/// A boxed, `Send` future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Shared handle to a host-native request.
pub type NativeRequestRef = Arc<dyn NativeRequest>;

/// Shared handle to a host-native response.
pub type NativeResponseRef = Arc<dyn NativeResponse>;

/// What a listener hands back to the host for one event.
///
/// An `Err` is an unhandled failure: the host decides what the client sees.
pub type Outcome = anyhow::Result<NativeResponseRef>;

/// Callback invoked by the host once per inbound event.
pub type Listener = Arc<dyn Fn(Box<dyn FetchEvent>) + Send + Sync>;

/// Deferred body readers of a native request or response.
///
/// The underlying stream is consumed by the first read. Whether a second
/// read fails is up to the host; the adapter passes the result through.
pub trait NativeBody: Send + Sync {
    fn text(&self) -> BoxFuture<'_, Result<String, HostError>>;

    fn array_buffer(&self) -> BoxFuture<'_, Result<Bytes, HostError>>;

    fn blob(&self) -> BoxFuture<'_, Result<Blob, HostError>>;

    fn form_data(&self) -> BoxFuture<'_, Result<FormData, HostError>>;
}

/// A request as the host represents it.
pub trait NativeRequest: NativeBody {
    /// Uppercase HTTP verb.
    fn method(&self) -> &str;

    /// Full URL.
    fn url(&self) -> &str;

    /// One enumeration pass over the host's header collection.
    fn header_entries(&self) -> Vec<(String, String)>;
}

/// A response as the host represents it.
pub trait NativeResponse: NativeBody {
    fn status(&self) -> u16;

    fn status_text(&self) -> &str;

    fn header_entries(&self) -> Vec<(String, String)>;
}

/// Options recognized by the host response constructor.
///
/// `None` fields are left out so the host applies its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseInit {
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub headers: Option<Headers>,
}

/// Options recognized by the host request constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInit {
    pub method: Option<HttpMethod>,
    pub headers: Option<Headers>,
}

/// One inbound event delivered to a listener.
pub trait FetchEvent: Send {
    /// The native request carried by this event.
    fn request(&self) -> NativeRequestRef;

    /// Answer the event with a settled outcome.
    fn respond_with(self: Box<Self>, outcome: Outcome);

    /// Answer the event with an outcome that settles later. The host keeps
    /// the invocation alive until the future completes.
    fn respond_with_deferred(self: Box<Self>, outcome: BoxFuture<'static, Outcome>);
}

/// The edge host's global primitives.
pub trait HostBridge: Send + Sync {
    /// Subscribe a listener to inbound fetch events.
    fn add_fetch_listener(&self, listener: Listener);

    /// Construct a native response.
    fn new_response(
        &self,
        body: Option<HostBody>,
        init: ResponseInit,
    ) -> Result<NativeResponseRef, HostError>;

    /// Construct a native request.
    fn new_request(
        &self,
        url: &str,
        body: Option<HostBody>,
        init: RequestInit,
    ) -> Result<NativeRequestRef, HostError>;

    /// Send a request over the network.
    ///
    /// Only legal while an invocation is active. HTTP error statuses resolve
    /// normally; only transport failures are errors.
    fn fetch(
        &self,
        request: NativeRequestRef,
    ) -> BoxFuture<'static, Result<NativeResponseRef, HostError>>;
}
