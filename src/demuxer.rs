use crate::constants;
use crate::constraints::Constraints;
use crate::state::{self, DemuxStage, DemuxState, Progress};
use crate::Part;
use http::header::{self, HeaderMap};
use std::ops::ControlFlow;

/// Represents an incremental demuxer for `multipart/x-mixed-replace` style
/// streams, such as MJPEG camera feeds.
///
/// Bytes are pushed in with [`feed`](Demuxer::feed) in whatever chunks the
/// transport delivers. Every complete part found is handed to the consumer
/// callback before `feed` returns, and unconsumed bytes are kept for the next
/// call.
///
/// Each part on the wire looks like:
///
/// ```text
/// CRLF "--" boundary CRLF
/// Content-Type: image/jpeg CRLF
/// Content-Length: 40669 CRLF
/// CRLF
/// <payload>
/// ```
///
/// With a positive `Content-Length` exactly that many payload bytes are read,
/// otherwise the payload runs up to the next delimiter.
///
/// A new demuxer starts reading part headers right away. A body that opens
/// with `CRLF "--" boundary CRLF` therefore ends its first header block on
/// that leading CRLF, and the whole first part is read as one untyped payload
/// and dropped. A body that opens with `"--" boundary CRLF` fails on that line
/// unless [`Constraints::skip_opening_delimiter`] is set.
///
/// # Examples
///
/// ```
/// use multipart_demux::{Demuxer, Progress};
/// use std::ops::ControlFlow;
///
/// let mut demuxer = Demuxer::new("multipart/x-mixed-replace; boundary=frame").unwrap();
/// let data = b"Content-Type: image/jpeg\r\n\r\n\xff\xd8\xff\xd9\r\n--frame\r\n";
///
/// let mut frames = Vec::new();
/// let progress = demuxer.feed(data, |part| {
///     frames.push(part.to_bytes());
///     ControlFlow::Continue(())
/// });
///
/// assert_eq!(progress, Ok(Progress::NeedMoreData));
/// assert_eq!(frames.len(), 1);
/// assert_eq!(&frames[0][..], b"\xff\xd8\xff\xd9");
/// ```
#[derive(Debug)]
pub struct Demuxer {
    state: DemuxState,
    constraints: Constraints,
    stats: Stats,
}

/// Counters kept by a [`Demuxer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Parts handed to the consumer.
    pub parts_emitted: u64,
    /// Parts dropped because their content type is not allowed.
    pub parts_dropped: u64,
    /// Total bytes passed to [`Demuxer::feed`].
    pub bytes_fed: u64,
}

impl Demuxer {
    /// Creates a demuxer from the outer response's `Content-Type` value, with
    /// the default [`Constraints`].
    ///
    /// Fails with [`Error::NoBoundary`](crate::Error::NoBoundary) when the value
    /// carries no usable `boundary` parameter.
    pub fn new<T: AsRef<str>>(content_type: T) -> crate::Result<Demuxer> {
        Demuxer::with_constraints(content_type, Constraints::default())
    }

    /// Creates a demuxer from the outer response's `Content-Type` value and
    /// the given [`Constraints`].
    pub fn with_constraints<T: AsRef<str>>(content_type: T, constraints: Constraints) -> crate::Result<Demuxer> {
        Demuxer::with_capacity(content_type, constraints, constants::DEFAULT_BUFFER_CAP)
    }

    /// Like [`with_constraints`](Demuxer::with_constraints), with an explicit
    /// initial buffer capacity.
    pub fn with_capacity<T: AsRef<str>>(
        content_type: T,
        constraints: Constraints,
        capacity: usize,
    ) -> crate::Result<Demuxer> {
        let token = crate::parse_boundary(content_type)?;

        log::debug!("creating demuxer with boundary: {:?}", token);

        Ok(Demuxer {
            state: DemuxState::new(&token, capacity),
            constraints,
            stats: Stats::default(),
        })
    }

    /// Creates a demuxer from the `Content-Type` of a response header map.
    pub fn from_headers(headers: &HeaderMap) -> crate::Result<Demuxer> {
        Demuxer::from_headers_with_constraints(headers, Constraints::default())
    }

    /// Like [`from_headers`](Demuxer::from_headers), with the given [`Constraints`].
    pub fn from_headers_with_constraints(headers: &HeaderMap, constraints: Constraints) -> crate::Result<Demuxer> {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .ok_or(crate::Error::MissingContentType)?
            .to_str()
            .map_err(crate::Error::DecodeContentType)?;

        Demuxer::with_constraints(content_type, constraints)
    }

    /// Appends `chunk` and delivers every part that is now complete.
    ///
    /// The callback runs inline; returning [`ControlFlow::Break`] stops the
    /// run at once and `feed` returns [`Progress::Stopped`], leaving any
    /// remaining buffered data untouched. Stopping is meant to be final, though
    /// a later `feed` picks up after the stopped part.
    ///
    /// A colon-less header line puts the demuxer in [`DemuxStage::Failed`] and
    /// returns [`Error::MalformedHeader`](crate::Error::MalformedHeader). Every
    /// call after that returns [`Error::BadStream`](crate::Error::BadStream)
    /// without invoking the callback.
    pub fn feed<F>(&mut self, chunk: &[u8], mut callback: F) -> crate::Result<Progress>
    where
        F: FnMut(Part<'_>) -> ControlFlow<()>,
    {
        if self.state.stage == DemuxStage::Failed {
            return Err(crate::Error::BadStream);
        }

        self.stats.bytes_fed += chunk.len() as u64;
        self.state.buffer.append(chunk);

        loop {
            log::trace!("demuxer stage: {:?}", self.state.stage);

            match self.state.stage {
                DemuxStage::Failed => return Err(crate::Error::BadStream),
                DemuxStage::InitPart => self.state.reset_part(),
                DemuxStage::ReadHeader => {
                    if !self.state.read_headers(self.constraints.skip_opening_delimiter)? {
                        return Ok(Progress::NeedMoreData);
                    }
                }
                DemuxStage::ReadPayload => {
                    let state = &mut self.state;

                    let payload = match state.payload_size {
                        Some(size) => match state.buffer.read_exact(size) {
                            Some(payload) => {
                                state.stage = DemuxStage::ReadDelimiter;
                                payload
                            }
                            None => return Ok(Progress::NeedMoreData),
                        },
                        None => match state.buffer.read_until(state.boundary.as_bytes()) {
                            Some(payload) => {
                                state.stage = DemuxStage::InitPart;
                                payload
                            }
                            None => return Ok(Progress::NeedMoreData),
                        },
                    };

                    if !self.constraints.is_allowed(&state.content_type) {
                        log::warn!(
                            "dropping {} byte part with unexpected Content-Type: {:?}",
                            payload.len(),
                            state.content_type
                        );
                        self.stats.parts_dropped += 1;
                        continue;
                    }

                    let part = Part::new(payload, &state.content_type, &state.headers, state.next_part_idx);
                    state.next_part_idx += 1;
                    self.stats.parts_emitted += 1;

                    if callback(part).is_break() {
                        log::debug!("consumer stopped the demuxer");
                        return Ok(Progress::Stopped);
                    }
                }
                DemuxStage::ReadDelimiter => {
                    let state = &mut self.state;

                    if state.buffer.read_until(state.boundary.as_bytes()).is_none() {
                        return Ok(Progress::NeedMoreData);
                    }

                    state.stage = DemuxStage::InitPart;
                }
            }
        }
    }

    /// The stage the demuxer is in.
    pub fn stage(&self) -> DemuxStage {
        self.state.stage
    }

    /// Whether a malformed header made the demuxer unusable.
    pub fn is_failed(&self) -> bool {
        self.state.stage == DemuxStage::Failed
    }

    /// The part delimiter without its CRLF framing, e.g. `--frame`.
    pub fn boundary(&self) -> &str {
        state::dash_boundary(&self.state.boundary)
    }

    /// Number of buffered bytes not consumed yet.
    pub fn buffered_len(&self) -> usize {
        self.state.buffer.remaining()
    }

    /// Counters of emitted and dropped parts and fed bytes.
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// The constraints the demuxer was created with.
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }
}
