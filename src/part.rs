use bytes::Bytes;
use http::header::HeaderMap;
use std::fmt;

/// A single part delivered by a [`Demuxer`](crate::Demuxer).
///
/// A `Part` borrows its payload from the demuxer buffer and only lives for
/// the duration of the consumer callback. Use [`to_bytes`](Part::to_bytes)
/// to keep the payload around.
pub struct Part<'a> {
    data: &'a [u8],
    content_type: &'a str,
    headers: &'a HeaderMap,
    idx: usize,
}

impl<'a> Part<'a> {
    pub(crate) fn new(data: &'a [u8], content_type: &'a str, headers: &'a HeaderMap, idx: usize) -> Self {
        Part {
            data,
            content_type,
            headers,
            idx,
        }
    }

    /// The payload bytes, e.g. one encoded JPEG frame.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The declared `Content-Type` of the part, as sent.
    pub fn content_type(&self) -> &'a str {
        self.content_type
    }

    /// The declared `Content-Type` parsed as [`mime::Mime`], if it is valid.
    pub fn mime(&self) -> Option<mime::Mime> {
        self.content_type.parse().ok()
    }

    /// All well-formed header lines of the part.
    pub fn headers(&self) -> &'a HeaderMap {
        self.headers
    }

    /// Zero-based position among the parts forwarded to the consumer.
    pub fn index(&self) -> usize {
        self.idx
    }

    /// Length of the payload in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Copies the payload out of the demuxer buffer.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.data)
    }
}

impl fmt::Debug for Part<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Part")
            .field("index", &self.idx)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .field("headers", self.headers)
            .finish()
    }
}
