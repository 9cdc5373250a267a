//! An in-memory host.
//!
//! [`FakeHost`] implements [`HostBridge`] without any runtime or network:
//! inbound events are delivered with [`FakeHost::dispatch`], outbound
//! fetches are answered by a stub installed with [`FakeHost::on_fetch`],
//! and every fetched request is recorded for inspection.
//!
//! It follows the usual edge-host semantics closely enough to exercise
//! handlers: bodies are one-shot streams, constructors reject statuses
//! outside `200..=599`, and a `GET` request cannot carry a body.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::Uri;
use tokio::sync::oneshot;

use crate::blob::Blob;
use crate::body::{Body, HostBody};
use crate::bridge::{
    BoxFuture, FetchEvent, HostBridge, Listener, NativeBody, NativeRequest, NativeRequestRef,
    NativeResponse, NativeResponseRef, Outcome, RequestInit, ResponseInit,
};
use crate::error::HostError;
use crate::form::{FORM_URLENCODED, FormData};
use crate::header::Headers;
use crate::method::HttpMethod;
use crate::request::Request;
use crate::response::Response;

const TEXT_PLAIN: &str = "text/plain;charset=UTF-8";
const CONTENT_TYPE: &str = "content-type";

type FetchStub = Arc<dyn Fn(&Request) -> Result<FakeResponse, HostError> + Send + Sync>;

/// In-memory [`HostBridge`] for tests and local runs.
#[derive(Default)]
pub struct FakeHost {
    listeners: Mutex<Vec<Listener>>,
    fetch_stub: Mutex<Option<FetchStub>>,
    fetched: Mutex<Vec<NativeRequestRef>>,
    deferred: AtomicUsize,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer outbound fetches with `stub`. Without a stub every fetch
    /// fails with a network error.
    pub fn on_fetch<F>(&self, stub: F)
    where
        F: Fn(&Request) -> Result<FakeResponse, HostError> + Send + Sync + 'static,
    {
        *self.fetch_stub.lock().unwrap() = Some(Arc::new(stub));
    }

    /// Every native request passed to fetch so far, in order.
    pub fn fetched(&self) -> Vec<NativeRequestRef> {
        self.fetched.lock().unwrap().clone()
    }

    /// Number of events answered with a deferred outcome.
    pub fn deferred_count(&self) -> usize {
        self.deferred.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    /// Deliver one inbound event and wait for its answer.
    pub async fn dispatch(&self, request: FakeRequest) -> anyhow::Result<Response> {
        self.dispatch_native(Arc::new(request)).await
    }

    /// Deliver an event carrying an existing native request.
    ///
    /// Every registered listener sees the event; the first answer wins and
    /// later ones are dropped. A deferred answer is awaited before
    /// returning, which is how the host keeps the invocation alive.
    pub async fn dispatch_native(&self, request: NativeRequestRef) -> anyhow::Result<Response> {
        let listeners = self.listeners.lock().unwrap().clone();
        if listeners.is_empty() {
            return Err(HostError::Unavailable("no fetch listener registered".into()).into());
        }

        let (tx, rx) = oneshot::channel();
        let reply = Arc::new(Mutex::new(Some(tx)));
        for listener in &listeners {
            let event = FakeEvent {
                request: Arc::clone(&request),
                reply: Arc::clone(&reply),
            };
            listener(Box::new(event));
        }
        drop(reply);

        let answer = rx
            .await
            .map_err(|_| HostError::Unavailable("listener did not respond".into()))?;
        let outcome = match answer {
            Answer::Settled(outcome) => outcome,
            Answer::Deferred(pending) => {
                self.deferred.fetch_add(1, Ordering::SeqCst);
                pending.await
            }
        };
        outcome.map(Response::from_native)
    }
}

impl HostBridge for FakeHost {
    fn add_fetch_listener(&self, listener: Listener) {
        self.listeners.lock().unwrap().push(listener);
    }

    fn new_response(
        &self,
        body: Option<HostBody>,
        init: ResponseInit,
    ) -> Result<NativeResponseRef, HostError> {
        let status = init.status.unwrap_or(200);
        if !(200..=599).contains(&status) {
            return Err(HostError::Construction(format!(
                "status {status} is outside 200..=599"
            )));
        }
        if matches!(status, 204 | 205 | 304) && body.is_some() {
            return Err(HostError::Construction(format!(
                "status {status} cannot have a body"
            )));
        }

        let mut response = FakeResponse::new(status);
        response.status_text = init.status_text.unwrap_or_default();
        response.headers = checked_headers(init.headers)?;
        if let Some(body) = body {
            response = response.host_body(body);
        }
        Ok(Arc::new(response))
    }

    fn new_request(
        &self,
        url: &str,
        body: Option<HostBody>,
        init: RequestInit,
    ) -> Result<NativeRequestRef, HostError> {
        let absolute = url
            .parse::<Uri>()
            .is_ok_and(|uri| uri.scheme().is_some() && uri.authority().is_some());
        if !absolute {
            return Err(HostError::Construction(format!("invalid URL: {url:?}")));
        }

        let method = init.method.unwrap_or(HttpMethod::Get);
        if method == HttpMethod::Get && body.is_some() {
            return Err(HostError::Construction(
                "request with GET method cannot have body".into(),
            ));
        }

        let mut request = FakeRequest::new(method.as_str(), url);
        request.headers = checked_headers(init.headers)?;
        if let Some(body) = body {
            request = request.host_body(body);
        }
        Ok(Arc::new(request))
    }

    fn fetch(
        &self,
        request: NativeRequestRef,
    ) -> BoxFuture<'static, Result<NativeResponseRef, HostError>> {
        self.fetched.lock().unwrap().push(Arc::clone(&request));
        let stub = self.fetch_stub.lock().unwrap().clone();

        let result = match stub {
            Some(stub) => stub(&Request::from_native(request))
                .map(|resp| Arc::new(resp) as NativeResponseRef),
            None => Err(HostError::Network(format!(
                "no route to {}",
                request.url()
            ))),
        };
        Box::pin(async move { result })
    }
}

impl fmt::Debug for FakeHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeHost")
            .field("listeners", &self.listener_count())
            .field("fetched", &self.fetched.lock().unwrap().len())
            .finish_non_exhaustive()
    }
}

fn checked_headers(headers: Option<Headers>) -> Result<Vec<(String, String)>, HostError> {
    let Some(headers) = headers else {
        return Ok(Vec::new());
    };
    headers
        .into_iter()
        .map(|(name, value)| -> Result<(String, String), HostError> {
            http::HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| HostError::Construction(format!("invalid header name: {name:?}")))?;
            http::HeaderValue::from_str(&value)
                .map_err(|_| HostError::Construction(format!("invalid value for header {name}")))?;
            Ok((name, value))
        })
        .collect()
}

enum Answer {
    Settled(Outcome),
    Deferred(BoxFuture<'static, Outcome>),
}

struct FakeEvent {
    request: NativeRequestRef,
    reply: Arc<Mutex<Option<oneshot::Sender<Answer>>>>,
}

impl FakeEvent {
    fn answer(&self, answer: Answer) {
        match self.reply.lock().unwrap().take() {
            Some(tx) => {
                let _ = tx.send(answer);
            }
            None => tracing::debug!("event already answered, dropping response"),
        }
    }
}

impl FetchEvent for FakeEvent {
    fn request(&self) -> NativeRequestRef {
        Arc::clone(&self.request)
    }

    fn respond_with(self: Box<Self>, outcome: Outcome) {
        self.answer(Answer::Settled(outcome));
    }

    fn respond_with_deferred(self: Box<Self>, outcome: BoxFuture<'static, Outcome>) {
        self.answer(Answer::Deferred(outcome));
    }
}

/// A one-shot body stream.
#[derive(Debug, Default)]
enum BodyState {
    /// No body at all; every read yields an empty value.
    #[default]
    Empty,
    Unread(HostBody),
    Used,
}

#[derive(Debug, Default)]
struct FakeBody {
    state: Mutex<BodyState>,
}

impl FakeBody {
    fn new(body: HostBody) -> Self {
        Self {
            state: Mutex::new(BodyState::Unread(body)),
        }
    }

    /// Take the body, leaving the stream consumed. `Ok(None)` for no body.
    fn take(&self) -> Result<Option<HostBody>, HostError> {
        let mut state = self.state.lock().unwrap();
        match std::mem::replace(&mut *state, BodyState::Used) {
            BodyState::Empty => {
                *state = BodyState::Empty;
                Ok(None)
            }
            BodyState::Unread(body) => Ok(Some(body)),
            BodyState::Used => Err(HostError::BodyUsed),
        }
    }

    fn text(&self) -> Result<String, HostError> {
        Ok(match self.take()? {
            None => String::new(),
            Some(HostBody::Text(text)) => text,
            Some(HostBody::Blob(blob)) => blob.text(),
            Some(HostBody::Form(form)) => form.to_urlencoded(),
        })
    }

    fn bytes(&self) -> Result<Bytes, HostError> {
        Ok(match self.take()? {
            None => Bytes::new(),
            Some(HostBody::Text(text)) => Bytes::from(text),
            Some(HostBody::Blob(blob)) => blob.into_bytes(),
            Some(HostBody::Form(form)) => Bytes::from(form.to_urlencoded()),
        })
    }

    fn blob(&self) -> Result<Blob, HostError> {
        Ok(match self.take()? {
            None => Blob::default(),
            Some(HostBody::Text(text)) => Blob::new(text).with_type(TEXT_PLAIN),
            Some(HostBody::Blob(blob)) => blob,
            Some(HostBody::Form(form)) => Blob::new(form.to_urlencoded()).with_type(FORM_URLENCODED),
        })
    }

    fn form_data(&self) -> Result<FormData, HostError> {
        Ok(match self.take()? {
            None => FormData::new(),
            Some(HostBody::Text(text)) => FormData::from_urlencoded(&text),
            Some(HostBody::Blob(blob)) => FormData::from_urlencoded(&blob.text()),
            Some(HostBody::Form(form)) => form,
        })
    }
}

/// Content type the host derives for a body when none is given.
fn derived_content_type(body: &HostBody) -> Option<String> {
    match body {
        HostBody::Text(_) => Some(TEXT_PLAIN.to_string()),
        HostBody::Blob(blob) => blob.content_type().map(str::to_string),
        HostBody::Form(_) => Some(FORM_URLENCODED.to_string()),
    }
}

/// Append the derived content type unless a content type is already set.
fn with_content_type(
    mut headers: Vec<(String, String)>,
    derived: Option<&str>,
) -> Vec<(String, String)> {
    let has_type = headers
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE));
    if let (false, Some(content_type)) = (has_type, derived) {
        headers.push((CONTENT_TYPE.to_string(), content_type.to_string()));
    }
    headers
}

/// A native request held in memory.
#[derive(Debug)]
pub struct FakeRequest {
    method: String,
    url: String,
    headers: Vec<(String, String)>,
    body_type: Option<String>,
    body: FakeBody,
}

impl FakeRequest {
    /// A request with no headers and no body. `method` is taken verbatim.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body_type: None,
            body: FakeBody::default(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(self, body: impl Into<Body>) -> Self {
        self.host_body(HostBody::from(body.into()))
    }

    fn host_body(mut self, body: HostBody) -> Self {
        self.body_type = derived_content_type(&body);
        self.body = FakeBody::new(body);
        self
    }
}

impl NativeBody for FakeRequest {
    fn text(&self) -> BoxFuture<'_, Result<String, HostError>> {
        Box::pin(async move { self.body.text() })
    }

    fn array_buffer(&self) -> BoxFuture<'_, Result<Bytes, HostError>> {
        Box::pin(async move { self.body.bytes() })
    }

    fn blob(&self) -> BoxFuture<'_, Result<Blob, HostError>> {
        Box::pin(async move { self.body.blob() })
    }

    fn form_data(&self) -> BoxFuture<'_, Result<FormData, HostError>> {
        Box::pin(async move { self.body.form_data() })
    }
}

impl NativeRequest for FakeRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn header_entries(&self) -> Vec<(String, String)> {
        with_content_type(self.headers.clone(), self.body_type.as_deref())
    }
}

/// A native response held in memory.
#[derive(Debug)]
pub struct FakeResponse {
    status: u16,
    status_text: String,
    headers: Vec<(String, String)>,
    body_type: Option<String>,
    body: FakeBody,
}

impl FakeResponse {
    /// A response with an empty status text, no headers and no body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            status_text: String::new(),
            headers: Vec::new(),
            body_type: None,
            body: FakeBody::default(),
        }
    }

    pub fn status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(self, body: impl Into<Body>) -> Self {
        self.host_body(HostBody::from(body.into()))
    }

    fn host_body(mut self, body: HostBody) -> Self {
        self.body_type = derived_content_type(&body);
        self.body = FakeBody::new(body);
        self
    }
}

impl NativeBody for FakeResponse {
    fn text(&self) -> BoxFuture<'_, Result<String, HostError>> {
        Box::pin(async move { self.body.text() })
    }

    fn array_buffer(&self) -> BoxFuture<'_, Result<Bytes, HostError>> {
        Box::pin(async move { self.body.bytes() })
    }

    fn blob(&self) -> BoxFuture<'_, Result<Blob, HostError>> {
        Box::pin(async move { self.body.blob() })
    }

    fn form_data(&self) -> BoxFuture<'_, Result<FormData, HostError>> {
        Box::pin(async move { self.body.form_data() })
    }
}

impl NativeResponse for FakeResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn status_text(&self) -> &str {
        &self.status_text
    }

    fn header_entries(&self) -> Vec<(String, String)> {
        with_content_type(self.headers.clone(), self.body_type.as_deref())
    }
}
