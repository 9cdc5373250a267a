//! Typed request/response adapter for single-invocation edge-compute hosts.
//!
//! A worker registers exactly one [`Handler`] with [`initialize`]. The host
//! delivers each inbound HTTP request as a fetch event; the handler receives
//! it as a [`Request`] (or a [`Context`] bundling the request with outbound
//! [`Context::fetch`]) and answers with a [`Reply`]: either a declarative
//! [`ResponseSpec`] or a ready [`Response`].
//!
//! # Host boundary
//!
//! Everything host-specific sits behind the object-safe traits in
//! [`bridge`]. [`Request`] and [`Response`] are thin handles over a shared
//! native object; they do not copy bodies or headers, and bodies stay
//! one-shot streams owned by the host. A second read fails with
//! [`HostError::BodyUsed`].
//!
//! [`fake::FakeHost`] is an in-memory host used by the test suite and handy
//! for running handlers locally.
//!
//! # Example
//!
//! ```
//! use edgeworker::fake::{FakeHost, FakeRequest};
//! use edgeworker::{Handler, ResponseSpec, initialize};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let host = FakeHost::new();
//! initialize(host.clone(), Handler::sync(|_req| Ok(ResponseSpec::new().body("Home"))));
//!
//! let resp = host.dispatch(FakeRequest::new("GET", "https://example.com/")).await.unwrap();
//! assert_eq!(resp.status(), 200);
//! assert_eq!(resp.body().await.unwrap(), "Home");
//! # });
//! ```

pub mod blob;
pub mod body;
pub mod bridge;
pub mod config;
mod context;
mod error;
pub mod fake;
pub mod form;
mod header;
mod method;
mod request;
mod response;
pub mod telemetry;
mod worker;

pub use blob::{Blob, ByteStream, DEFAULT_CHUNK_SIZE};
pub use body::{Body, HostBody};
pub use bridge::{
    BoxFuture, FetchEvent, HostBridge, NativeBody, NativeRequest, NativeRequestRef,
    NativeResponse, NativeResponseRef,
};
pub use config::{LogFormat, LoggingConfig, WorkerConfig};
pub use context::Context;
pub use error::{Error, HostError, Result};
pub use form::{FormData, FormValue};
pub use header::Headers;
pub use method::HttpMethod;
pub use request::{Request, RequestSpec, path_segments};
pub use response::{Reply, Response, ResponseSpec};
pub use worker::{AsyncHandler, ContextHandler, Handler, SyncHandler, initialize};
