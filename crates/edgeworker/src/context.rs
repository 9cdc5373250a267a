use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::bridge::HostBridge;
use crate::error::HostError;
use crate::request::{Request, RequestSpec};
use crate::response::Response;

/// Capabilities handed to a context-aware handler for one invocation.
///
/// Bundles the inbound request with a fetch operation that is only valid
/// while this invocation runs. Do not keep a `Context` past the handler's
/// future: the host may reject fetches issued after the event settled.
pub struct Context {
    request: Request,
    host: Arc<dyn HostBridge>,
}

impl Context {
    pub(crate) fn new(request: Request, host: Arc<dyn HostBridge>) -> Self {
        Self { request, host }
    }

    /// The inbound request of this invocation.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The host, for building requests and responses.
    pub fn host(&self) -> &dyn HostBridge {
        &*self.host
    }

    /// Send `request` over the network.
    ///
    /// The outbound call is issued immediately, exactly once, with the very
    /// native request behind `request`. The returned future resolves to the
    /// host's response, whatever its status; it fails only when the
    /// transport does.
    pub fn fetch(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<Response, HostError>> + Send + 'static {
        tracing::debug!(url = request.url(), "fetch");
        let pending = self.host.fetch(Arc::clone(request.as_native()));
        async move { pending.await.map(Response::from_native) }
    }

    /// Build `spec` through the host and fetch it.
    pub async fn send(&self, spec: RequestSpec) -> Result<Response, HostError> {
        let request = spec.build(self.host())?;
        self.fetch(&request).await
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeHost, FakeRequest, FakeResponse};
    use crate::method::HttpMethod;

    fn context(host: &Arc<FakeHost>, url: &str) -> Context {
        let request = Request::from_native(Arc::new(FakeRequest::new("GET", url)));
        Context::new(request, host.clone())
    }

    #[tokio::test]
    async fn fetch_forwards_the_exact_native_request() {
        let host = FakeHost::new();
        host.on_fetch(|_| Ok(FakeResponse::new(200).body("upstream")));
        let ctx = context(&host, "https://example.com/a");

        let resp = ctx.fetch(ctx.request()).await.unwrap();
        assert_eq!(resp.body().await.unwrap(), "upstream");

        let fetched = host.fetched();
        assert_eq!(fetched.len(), 1);
        assert!(Arc::ptr_eq(&fetched[0], ctx.request().as_native()));
    }

    #[tokio::test]
    async fn error_status_is_not_a_failure() {
        let host = FakeHost::new();
        host.on_fetch(|_| Ok(FakeResponse::new(503).status_text("Service Unavailable")));
        let ctx = context(&host, "https://example.com/");

        let resp = ctx.fetch(ctx.request()).await.unwrap();
        assert_eq!(resp.status(), 503);
        assert!(!resp.ok());
    }

    #[tokio::test]
    async fn transport_failure_is_surfaced_unchanged() {
        let host = FakeHost::new();
        host.on_fetch(|_| Err(HostError::Network("dns lookup failed".into())));
        let ctx = context(&host, "https://example.com/");

        let err = ctx.fetch(ctx.request()).await.unwrap_err();
        assert_eq!(err, HostError::Network("dns lookup failed".into()));
    }

    #[tokio::test]
    async fn send_builds_then_fetches() {
        let host = FakeHost::new();
        host.on_fetch(|req| {
            Ok(FakeResponse::new(200).body(format!("{} {}", req.method().unwrap(), req.url())))
        });
        let ctx = context(&host, "https://example.com/");

        let resp = ctx
            .send(
                RequestSpec::new("https://api.example.com/items")
                    .method(HttpMethod::Post)
                    .body("{}"),
            )
            .await
            .unwrap();

        assert_eq!(resp.body().await.unwrap(), "POST https://api.example.com/items");
        assert_eq!(host.fetched().len(), 1);
    }
}
