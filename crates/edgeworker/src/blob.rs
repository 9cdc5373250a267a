//! Binary blobs and their chunked streams.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;

/// Default chunk size used by [`Blob::stream()`] (64 KB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// A type-erased stream of byte chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Bytes> + Send>>;

/// Immutable binary data with an optional MIME type.
///
/// Cloning is cheap: the bytes are reference counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob {
    bytes: Bytes,
    content_type: Option<String>,
}

impl Blob {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
        }
    }

    /// Set the MIME type. An empty string clears it.
    pub fn with_type(mut self, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        self.content_type = (!content_type.is_empty()).then_some(content_type);
        self
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Decode the contents as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Stream the contents in [`DEFAULT_CHUNK_SIZE`] chunks.
    pub fn stream(&self) -> ByteStream {
        self.stream_chunked(DEFAULT_CHUNK_SIZE)
    }

    /// Like [`stream()`](Blob::stream) but with a custom chunk size.
    ///
    /// Every chunk shares the blob's allocation. Panics if `chunk_size` is
    /// zero.
    pub fn stream_chunked(&self, chunk_size: usize) -> ByteStream {
        assert!(chunk_size > 0, "blob chunk size must be non-zero");
        Box::pin(Chunks {
            rest: self.bytes.clone(),
            chunk_size,
        })
    }
}

impl From<Bytes> for Blob {
    fn from(bytes: Bytes) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// Splits chunks off the front of the remaining bytes.
struct Chunks {
    rest: Bytes,
    chunk_size: usize,
}

impl Stream for Chunks {
    type Item = Bytes;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Bytes>> {
        if self.rest.is_empty() {
            return Poll::Ready(None);
        }
        let at = self.chunk_size.min(self.rest.len());
        Poll::Ready(Some(self.rest.split_to(at)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.rest.len().div_ceil(self.chunk_size);
        (left, Some(left))
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;

    #[test]
    fn blob_accessors() {
        let blob = Blob::new(vec![1u8, 2, 3]).with_type("application/octet-stream");
        assert_eq!(blob.size(), 3);
        assert_eq!(blob.content_type(), Some("application/octet-stream"));
        assert_eq!(blob.bytes().as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn empty_type_clears_content_type() {
        let blob = Blob::new("x").with_type("text/plain").with_type("");
        assert_eq!(blob.content_type(), None);
    }

    #[test]
    fn text_is_lossy() {
        let blob = Blob::new(vec![b'h', b'i', 0xFF]);
        assert_eq!(blob.text(), "hi\u{FFFD}");
    }

    #[tokio::test]
    async fn last_chunk_holds_the_remainder() {
        let sizes: Vec<usize> = Blob::new(vec![0xBB; 3000])
            .stream_chunked(1024)
            .map(|chunk| chunk.len())
            .collect()
            .await;
        assert_eq!(sizes, vec![1024, 1024, 952]);
    }

    #[tokio::test]
    async fn empty_blob_yields_nothing() {
        assert_eq!(Blob::default().stream().count().await, 0);
    }

    #[tokio::test]
    async fn chunks_reassemble_to_the_original() {
        let data: Vec<u8> = (0..=255).cycle().take(10_000).collect();
        let blob = Blob::new(data.clone());

        let chunks: Vec<Bytes> = blob.stream_chunked(777).collect().await;
        assert_eq!(chunks.concat(), data);
    }

    #[tokio::test]
    async fn chunks_share_the_blob_allocation() {
        let blob = Blob::new(vec![0xFF; 8192]);
        let first = blob.stream_chunked(4096).next().await.unwrap();
        assert_eq!(first.as_ptr(), blob.bytes().as_ptr());
    }

    #[test]
    fn size_hint_counts_remaining_chunks() {
        let stream = Blob::new(vec![0u8; 2500]).stream_chunked(1000);
        assert_eq!(stream.size_hint(), (3, Some(3)));
    }

    #[test]
    #[should_panic(expected = "blob chunk size must be non-zero")]
    fn zero_chunk_size_panics() {
        let _ = Blob::default().stream_chunked(0);
    }
}
