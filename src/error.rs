use std::fmt::{self, Debug, Display, Formatter};

use derive_more::Display;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A set of errors that can occur while creating a demuxer or while
/// feeding it a multipart stream.
#[derive(Display)]
#[non_exhaustive]
pub enum Error {
    /// No `boundary` parameter found in the `Content-Type` value.
    #[display(fmt = "multipart boundary not found in Content-Type")]
    NoBoundary,

    /// The response carries no `Content-Type` header.
    #[display(fmt = "Content-Type header missing from response")]
    MissingContentType,

    /// The `Content-Type` header value is not visible ASCII.
    #[display(fmt = "failed to decode Content-Type header value: {}", _0)]
    DecodeContentType(http::header::ToStrError),

    /// A non-empty part header line has no `:` separator. The demuxer is
    /// unusable afterwards.
    #[display(fmt = "malformed part header line: {:?}", line)]
    MalformedHeader { line: String },

    /// The demuxer already failed and rejects any further input.
    #[display(fmt = "multipart stream already failed")]
    BadStream,

    /// Failed to parse a raw HTTP response head.
    #[display(fmt = "failed to read response head: {}", _0)]
    ReadResponseHead(httparse::Error),

    /// Stream read failed.
    #[display(fmt = "stream read failed: {}", _0)]
    StreamReadFailed(BoxError),
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DecodeContentType(err) => Some(err),
            Error::ReadResponseHead(err) => Some(err),
            Error::StreamReadFailed(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string().eq(&other.to_string())
    }
}

impl Eq for Error {}

impl From<httparse::Error> for Error {
    fn from(err: httparse::Error) -> Self {
        Error::ReadResponseHead(err)
    }
}
