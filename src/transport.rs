//! Glue between a transport and a [`Demuxer`].
//!
//! The demuxer itself only sees bytes. These helpers cover the usual ways of
//! getting them: a raw HTTP/1.x response, a [`Stream`] of body chunks (as
//! `hyper` bodies or `reqwest` byte streams provide), a blocking
//! [`std::io::Read`] and, with the `tokio-io` feature, a tokio
//! [`AsyncRead`](tokio::io::AsyncRead).

use crate::constants;
use crate::constraints::Constraints;
use crate::{Demuxer, Part, Progress};
use futures_util::stream::{Stream, StreamExt};
use std::io::Read;
use std::ops::ControlFlow;
#[cfg(feature = "tokio-io")]
use tokio::io::AsyncRead;
#[cfg(feature = "tokio-io")]
use tokio_util::io::ReaderStream;

/// Size of the read buffer used by [`demux_read`].
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// How a driven stream came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The transport ran out of bytes.
    Ended,
    /// The consumer asked to stop.
    Stopped,
}

/// Parses a raw HTTP/1.x response head and creates a [`Demuxer`] from its
/// `Content-Type` header, with the default [`Constraints`].
///
/// Returns `Ok(None)` while the head is incomplete. Once complete, the head
/// length is returned alongside the demuxer; the bytes after it are body and
/// should go to [`Demuxer::feed`].
///
/// # Examples
///
/// ```
/// use multipart_demux::transport;
///
/// let head = b"HTTP/1.1 200 OK\r\nContent-Type: multipart/x-mixed-replace; boundary=frame\r\n\r\n--frame";
///
/// let (len, demuxer) = transport::from_response_head(head).unwrap().unwrap();
/// assert_eq!(&head[len..], b"--frame");
/// assert_eq!(demuxer.boundary(), "--frame");
/// ```
pub fn from_response_head(head: &[u8]) -> crate::Result<Option<(usize, Demuxer)>> {
    from_response_head_with_constraints(head, Constraints::default())
}

pub fn from_response_head_with_constraints(
    head: &[u8],
    constraints: Constraints,
) -> crate::Result<Option<(usize, Demuxer)>> {
    let mut headers = [httparse::EMPTY_HEADER; constants::MAX_HEADERS];
    let mut res = httparse::Response::new(&mut headers);

    let len = match res.parse(head)? {
        httparse::Status::Complete(len) => len,
        httparse::Status::Partial => return Ok(None),
    };

    log::debug!("response head complete: status {:?}, {} bytes", res.code, len);

    let content_type = res
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case("content-type"))
        .map(|h| String::from_utf8_lossy(h.value))
        .ok_or(crate::Error::MissingContentType)?;

    let demuxer = Demuxer::with_constraints(content_type, constraints)?;

    Ok(Some((len, demuxer)))
}

/// Drives `demuxer` with every chunk of `stream` until the stream ends, the
/// consumer stops, or the multipart data turns out malformed.
///
/// The callback runs inline, so the next chunk is only polled once all parts
/// of the current one have been consumed.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use futures_util::stream;
/// use multipart_demux::transport::{self, Outcome};
/// use multipart_demux::Demuxer;
/// use std::convert::Infallible;
/// use std::ops::ControlFlow;
///
/// # async fn run() {
/// let data = "Content-Type: image/png\r\n\r\nPNG\r\n--frame\r\n";
/// let stream = stream::iter(data.as_bytes().chunks(3).map(|c| Ok::<_, Infallible>(Bytes::copy_from_slice(c))));
///
/// let mut demuxer = Demuxer::new("multipart/x-mixed-replace; boundary=frame").unwrap();
/// let outcome = transport::demux_stream(stream, &mut demuxer, |part| {
///     assert_eq!(part.data(), b"PNG");
///     ControlFlow::Continue(())
/// })
/// .await
/// .unwrap();
///
/// assert_eq!(outcome, Outcome::Ended);
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(run());
/// ```
pub async fn demux_stream<S, O, E, F>(stream: S, demuxer: &mut Demuxer, mut callback: F) -> crate::Result<Outcome>
where
    S: Stream<Item = Result<O, E>>,
    O: AsRef<[u8]>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
    F: FnMut(Part<'_>) -> ControlFlow<()>,
{
    futures_util::pin_mut!(stream);

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| crate::Error::StreamReadFailed(err.into()))?;

        if demuxer.feed(chunk.as_ref(), &mut callback)? == Progress::Stopped {
            return Ok(Outcome::Stopped);
        }
    }

    log::debug!("stream ended with {} unconsumed bytes", demuxer.buffered_len());

    Ok(Outcome::Ended)
}

/// Same as [`demux_stream`], reading from a tokio [`AsyncRead`].
///
/// # Optional
///
/// This requires the optional `tokio-io` feature to be enabled.
#[cfg(feature = "tokio-io")]
pub async fn demux_reader<R, F>(reader: R, demuxer: &mut Demuxer, callback: F) -> crate::Result<Outcome>
where
    R: AsyncRead,
    F: FnMut(Part<'_>) -> ControlFlow<()>,
{
    demux_stream(ReaderStream::new(reader), demuxer, callback).await
}

/// Blocking counterpart of [`demux_stream`] for any [`std::io::Read`].
pub fn demux_read<R, F>(mut reader: R, demuxer: &mut Demuxer, mut callback: F) -> crate::Result<Outcome>
where
    R: Read,
    F: FnMut(Part<'_>) -> ControlFlow<()>,
{
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(crate::Error::StreamReadFailed(err.into())),
        };

        if demuxer.feed(&chunk[..n], &mut callback)? == Progress::Stopped {
            return Ok(Outcome::Stopped);
        }
    }

    log::debug!("reader ended with {} unconsumed bytes", demuxer.buffered_len());

    Ok(Outcome::Ended)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEAD: &[u8] = b"HTTP/1.1 200 OK\r\nServer: cam\r\ncontent-type: multipart/x-mixed-replace;boundary=frame\r\n\r\n";

    #[test]
    fn test_from_response_head() {
        assert!(from_response_head(&HEAD[..20]).unwrap().is_none());

        let mut data = HEAD.to_vec();
        data.extend_from_slice(b"--frame\r\n");

        let (len, demuxer) = from_response_head(&data).unwrap().unwrap();
        assert_eq!(len, HEAD.len());
        assert_eq!(demuxer.boundary(), "--frame");
    }

    #[test]
    fn test_from_response_head_errors() {
        let head = b"HTTP/1.1 200 OK\r\nServer: cam\r\n\r\n";
        assert_eq!(
            from_response_head(head).unwrap_err(),
            crate::Error::MissingContentType
        );

        let head = b"HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\n\r\n";
        assert_eq!(from_response_head(head).unwrap_err(), crate::Error::NoBoundary);

        let head = b"NOT HTTP\r\n\r\n";
        assert!(matches!(
            from_response_head(head),
            Err(crate::Error::ReadResponseHead(_))
        ));
    }

    #[test]
    fn test_demux_read() {
        let data = b"--frame\r\nContent-Type: image/jpeg\r\n\r\none\r\n--frame\r\nContent-Type: image/jpeg\r\n\r\ntwo\r\n--frame\r\n";

        let constraints = Constraints::new().skip_opening_delimiter(true);
        let mut demuxer = Demuxer::with_constraints("multipart/x-mixed-replace;boundary=frame", constraints).unwrap();
        let mut parts = Vec::new();

        let outcome = demux_read(&data[..], &mut demuxer, |part| {
            parts.push(part.to_bytes());
            ControlFlow::Continue(())
        });

        assert_eq!(outcome, Ok(Outcome::Ended));
        assert_eq!(parts, vec!["one", "two"]);
    }

    #[test]
    fn test_demux_read_stop() {
        let data = b"--frame\r\nContent-Type: image/jpeg\r\n\r\none\r\n--frame\r\nContent-Type: image/jpeg\r\n\r\ntwo\r\n--frame\r\n";

        let constraints = Constraints::new().skip_opening_delimiter(true);
        let mut demuxer = Demuxer::with_constraints("multipart/x-mixed-replace;boundary=frame", constraints).unwrap();
        let mut count = 0;

        let outcome = demux_read(&data[..], &mut demuxer, |_| {
            count += 1;
            ControlFlow::Break(())
        });

        assert_eq!(outcome, Ok(Outcome::Stopped));
        assert_eq!(count, 1);
    }
}
