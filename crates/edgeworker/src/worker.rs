//! Worker registration.
//!
//! [`initialize`] subscribes one [`Handler`] to the host's fetch events.
//! Per event it wraps the native request, runs the handler once, and hands
//! the resulting response back to the host:
//!
//! ```text
//! FetchEvent
//!   │
//!   ├── Sync         handler(Request)  ──► respond_with(outcome)
//!   ├── Async        handler(Request)  ──► respond_with_deferred(future)
//!   └── WithContext  handler(Context)  ──► respond_with_deferred(future)
//! ```
//!
//! Handler errors are not caught. They reach the host as a failed outcome
//! and the host decides what the client sees.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::Instrument;

use crate::bridge::{BoxFuture, FetchEvent, HostBridge, Outcome};
use crate::context::Context;
use crate::request::Request;
use crate::response::{Reply, Response};

/// Synchronous handler: request in, reply out.
pub type SyncHandler = Box<dyn Fn(Request) -> anyhow::Result<Reply> + Send + Sync>;

/// Asynchronous handler over the inbound request.
pub type AsyncHandler =
    Box<dyn Fn(Request) -> BoxFuture<'static, anyhow::Result<Reply>> + Send + Sync>;

/// Asynchronous handler over a per-invocation [`Context`].
pub type ContextHandler =
    Box<dyn Fn(Context) -> BoxFuture<'static, anyhow::Result<Reply>> + Send + Sync>;

/// The three handler shapes a worker can register.
pub enum Handler {
    Sync(SyncHandler),
    Async(AsyncHandler),
    WithContext(ContextHandler),
}

impl Handler {
    /// Wrap a synchronous function.
    pub fn sync<F, R>(f: F) -> Self
    where
        F: Fn(Request) -> anyhow::Result<R> + Send + Sync + 'static,
        R: Into<Reply>,
    {
        Handler::Sync(Box::new(move |req: Request| f(req).map(Into::<Reply>::into)))
    }

    /// Wrap an async function of the request.
    pub fn asynchronous<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        R: Into<Reply>,
    {
        Handler::Async(Box::new(
            move |req: Request| -> BoxFuture<'static, anyhow::Result<Reply>> {
                let pending = f(req);
                Box::pin(async move { pending.await.map(Into::<Reply>::into) })
            },
        ))
    }

    /// Wrap an async function of the invocation [`Context`].
    pub fn with_context<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        R: Into<Reply>,
    {
        Handler::WithContext(Box::new(
            move |ctx: Context| -> BoxFuture<'static, anyhow::Result<Reply>> {
                let pending = f(ctx);
                Box::pin(async move { pending.await.map(Into::<Reply>::into) })
            },
        ))
    }

    fn shape(&self) -> &'static str {
        match self {
            Handler::Sync(_) => "sync",
            Handler::Async(_) => "async",
            Handler::WithContext(_) => "context",
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.shape()).finish()
    }
}

/// Register `handler` for every inbound fetch event of `host`.
///
/// Calling this more than once adds more listeners; what the host does
/// with several is up to the host.
pub fn initialize(host: Arc<dyn HostBridge>, handler: Handler) {
    tracing::debug!(shape = handler.shape(), "registering fetch handler");
    let handler = Arc::new(handler);
    let bridge = Arc::clone(&host);
    host.add_fetch_listener(Arc::new(move |event: Box<dyn FetchEvent>| {
        dispatch(&bridge, &handler, event)
    }));
}

fn dispatch(host: &Arc<dyn HostBridge>, handler: &Handler, event: Box<dyn FetchEvent>) {
    let request = Request::from_native(event.request());
    let span = tracing::debug_span!(
        "invocation",
        method = request.as_native().method(),
        url = request.url()
    );

    match handler {
        Handler::Sync(f) => {
            let _entered = span.enter();
            let outcome = f(request).and_then(|reply| {
                let response = reply.into_response(&**host)?;
                Ok(response.into_native())
            });
            log_outcome(&outcome);
            event.respond_with(outcome);
        }
        Handler::Async(f) => {
            let pending = span.in_scope(|| f(request));
            let settled = settle(Arc::clone(host), pending).instrument(span);
            event.respond_with_deferred(Box::pin(settled));
        }
        Handler::WithContext(f) => {
            let ctx = Context::new(request, Arc::clone(host));
            let pending = span.in_scope(|| f(ctx));
            let settled = settle(Arc::clone(host), pending).instrument(span);
            event.respond_with_deferred(Box::pin(settled));
        }
    }
}

async fn settle(
    host: Arc<dyn HostBridge>,
    pending: BoxFuture<'static, anyhow::Result<Reply>>,
) -> Outcome {
    let outcome = match pending.await {
        Ok(reply) => reply
            .into_response(&*host)
            .map(Response::into_native)
            .map_err(Into::into),
        Err(err) => Err(err),
    };
    log_outcome(&outcome);
    outcome
}

fn log_outcome(outcome: &Outcome) {
    match outcome {
        Ok(response) => tracing::debug!(status = response.status(), "handler settled"),
        Err(err) => tracing::warn!(error = %err, "handler failed"),
    }
}
