use bytes::Bytes;

use crate::blob::Blob;
use crate::form::FormData;

/// MIME type given to raw byte bodies before they reach the host.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// The body of an outbound response or request.
///
/// The variant is chosen by the type handed to a builder's `body()` method:
/// strings become `Text`, byte buffers `Bytes`, and so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Bytes(Bytes),
    Blob(Blob),
    Form(FormData),
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes.into())
    }
}

impl From<&[u8]> for Body {
    fn from(bytes: &[u8]) -> Self {
        Body::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<Blob> for Body {
    fn from(blob: Blob) -> Self {
        Body::Blob(blob)
    }
}

impl From<FormData> for Body {
    fn from(form: FormData) -> Self {
        Body::Form(form)
    }
}

/// A body in one of the shapes the host constructors accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostBody {
    Text(String),
    Blob(Blob),
    Form(FormData),
}

impl From<Body> for HostBody {
    /// Raw bytes are not accepted by the host, so they travel as an
    /// `application/octet-stream` blob.
    fn from(body: Body) -> Self {
        match body {
            Body::Text(text) => HostBody::Text(text),
            Body::Bytes(bytes) => HostBody::Blob(Blob::new(bytes).with_type(OCTET_STREAM)),
            Body::Blob(blob) => HostBody::Blob(blob),
            Body::Form(form) => HostBody::Form(form),
        }
    }
}
