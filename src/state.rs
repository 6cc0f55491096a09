use crate::buffer::StreamBuffer;
use crate::constants;
use crate::helpers;
use http::header::HeaderMap;

#[derive(Debug)]
pub(crate) struct DemuxState {
    pub(crate) buffer: StreamBuffer,
    /// Full delimiter, `CRLF "--" token CRLF`.
    pub(crate) boundary: String,
    pub(crate) stage: DemuxStage,
    pub(crate) content_type: String,
    /// `None` until a positive `Content-Length` is seen for the current part.
    pub(crate) payload_size: Option<usize>,
    pub(crate) headers: HeaderMap,
    pub(crate) next_part_idx: usize,
}

/// Where a [`Demuxer`](crate::Demuxer) is in the current part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemuxStage {
    /// About to start a new part.
    InitPart,
    /// Reading part header lines up to the blank line.
    ReadHeader,
    /// Reading the part payload, by length or up to the next boundary.
    ReadPayload,
    /// Skipping the delimiter that follows a fixed-length payload.
    ReadDelimiter,
    /// A malformed header was seen. Terminal.
    Failed,
}

/// Outcome of a successful [`Demuxer::feed`](crate::Demuxer::feed) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Every complete part was delivered; feed more bytes to continue.
    NeedMoreData,
    /// The consumer asked to stop.
    Stopped,
}

impl DemuxState {
    pub(crate) fn new(token: &str, capacity: usize) -> Self {
        DemuxState {
            buffer: StreamBuffer::with_capacity(capacity),
            boundary: format!("{}{}{}{}", constants::CRLF, constants::BOUNDARY_EXT, token, constants::CRLF),
            stage: DemuxStage::InitPart,
            content_type: String::new(),
            payload_size: None,
            headers: HeaderMap::new(),
            next_part_idx: 0,
        }
    }

    pub(crate) fn reset_part(&mut self) {
        self.payload_size = None;
        self.content_type.clear();
        self.headers.clear();
        self.buffer.compact();
        self.stage = DemuxStage::ReadHeader;
    }

    /// Consumes header lines until the blank line that ends the block.
    ///
    /// Returns `Ok(false)` when the buffered data runs out first. With
    /// `skip_opening_delimiter`, a line equal to `"--" token` is skipped
    /// instead of failing as a colon-less line.
    pub(crate) fn read_headers(&mut self, skip_opening_delimiter: bool) -> crate::Result<bool> {
        while let Some(line) = self.buffer.read_until(constants::CRLF.as_bytes()) {
            let line = helpers::trim(line);

            if line.is_empty() {
                self.stage = DemuxStage::ReadPayload;
                return Ok(true);
            }

            // Opening delimiter sent without its leading CRLF.
            if skip_opening_delimiter && line == dash_boundary(&self.boundary).as_bytes() {
                log::trace!("skipping opening delimiter line");
                continue;
            }

            let (tag, value) = match helpers::split_tag_value(line) {
                Some(pair) => pair,
                None => {
                    let line = String::from_utf8_lossy(line).into_owned();
                    log::warn!("malformed part header line: {:?}", line);

                    self.stage = DemuxStage::Failed;
                    return Err(crate::Error::MalformedHeader { line });
                }
            };

            if tag.is_empty() || value.is_empty() {
                continue;
            }

            if helpers::eq_ignore_ascii_case(tag, b"Content-Type") {
                self.content_type = String::from_utf8_lossy(value).into_owned();
            } else if helpers::eq_ignore_ascii_case(tag, b"Content-Length") {
                match parse_content_length(value) {
                    Some(size) => self.payload_size = Some(size),
                    None => log::warn!("invalid Content-Length value: {:?}", String::from_utf8_lossy(value)),
                }
            }

            helpers::append_raw_header(&mut self.headers, tag, value);
        }

        Ok(false)
    }
}

/// The delimiter without its CRLF framing, i.e. `"--" token`.
pub(crate) fn dash_boundary(boundary: &str) -> &str {
    &boundary[constants::CRLF.len()..boundary.len() - constants::CRLF.len()]
}

fn parse_content_length(value: &[u8]) -> Option<usize> {
    if value.is_empty() || !value.iter().all(u8::is_ascii_digit) {
        return None;
    }

    std::str::from_utf8(value)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|size| *size > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = DemuxState::new("myboundary", 0);

        assert_eq!(state.boundary, "\r\n--myboundary\r\n");
        assert_eq!(dash_boundary(&state.boundary), "--myboundary");
        assert_eq!(state.stage, DemuxStage::InitPart);
        assert_eq!(state.payload_size, None);
    }

    #[test]
    fn test_parse_content_length() {
        assert_eq!(parse_content_length(b"40669"), Some(40669));
        assert_eq!(parse_content_length(b"0"), None);
        assert_eq!(parse_content_length(b"-12"), None);
        assert_eq!(parse_content_length(b"12abc"), None);
        assert_eq!(parse_content_length(b"+12"), None);
        assert_eq!(parse_content_length(b"99999999999999999999999"), None);
        assert_eq!(parse_content_length(b""), None);
    }

    #[test]
    fn test_read_headers_partial_then_complete() {
        let mut state = DemuxState::new("b", 0);
        state.reset_part();

        state.buffer.append(b"Content-Type: image/png\r\nContent-Len");
        assert_eq!(state.read_headers(false), Ok(false));
        assert_eq!(state.content_type, "image/png");
        assert_eq!(state.stage, DemuxStage::ReadHeader);

        state.buffer.append(b"gth: 42\r\n\r\npayload");
        assert_eq!(state.read_headers(false), Ok(true));
        assert_eq!(state.payload_size, Some(42));
        assert_eq!(state.stage, DemuxStage::ReadPayload);
        assert_eq!(state.headers.len(), 2);
        assert_eq!(state.buffer.remaining(), 7);
    }

    #[test]
    fn test_invalid_content_length_keeps_previous() {
        let mut state = DemuxState::new("b", 0);
        state.reset_part();

        state.buffer.append(b"Content-Length: 10\r\ncontent-length: 0\r\nCONTENT-LENGTH: nope\r\n\r\n");
        assert_eq!(state.read_headers(false), Ok(true));
        assert_eq!(state.payload_size, Some(10));
    }

    #[test]
    fn test_empty_tag_or_value_is_skipped() {
        let mut state = DemuxState::new("b", 0);
        state.reset_part();

        state.buffer.append(b": image/png\r\nContent-Type:   \r\n\r\n");
        assert_eq!(state.read_headers(false), Ok(true));
        assert_eq!(state.content_type, "");
        assert!(state.headers.is_empty());
    }

    #[test]
    fn test_malformed_header_fails() {
        let mut state = DemuxState::new("b", 0);
        state.reset_part();

        state.buffer.append(b"X-Custom\r\n\r\n");
        assert_eq!(
            state.read_headers(false),
            Err(crate::Error::MalformedHeader {
                line: "X-Custom".to_owned()
            })
        );
        assert_eq!(state.stage, DemuxStage::Failed);
    }

    #[test]
    fn test_opening_delimiter_is_skipped() {
        let mut state = DemuxState::new("frame", 0);
        state.reset_part();

        state.buffer.append(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n");
        assert_eq!(state.read_headers(true), Ok(true));
        assert_eq!(state.content_type, "image/jpeg");
    }

    #[test]
    fn test_opening_delimiter_fails_when_not_skipped() {
        let mut state = DemuxState::new("frame", 0);
        state.reset_part();

        state.buffer.append(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n");
        assert_eq!(
            state.read_headers(false),
            Err(crate::Error::MalformedHeader {
                line: "--frame".to_owned()
            })
        );
        assert_eq!(state.stage, DemuxStage::Failed);
    }

    #[test]
    fn test_only_exact_delimiter_is_skipped() {
        let mut state = DemuxState::new("frame", 0);
        state.reset_part();

        state.buffer.append(b"--other\r\n\r\n");
        assert_eq!(
            state.read_headers(true),
            Err(crate::Error::MalformedHeader {
                line: "--other".to_owned()
            })
        );
    }

    #[test]
    fn test_reset_part() {
        let mut state = DemuxState::new("b", 0);
        state.buffer.append(b"Content-Type: image/png\r\nContent-Length: 3\r\n\r\nabc");
        state.reset_part();
        assert_eq!(state.read_headers(false), Ok(true));

        state.reset_part();
        assert_eq!(state.stage, DemuxStage::ReadHeader);
        assert_eq!(state.payload_size, None);
        assert_eq!(state.content_type, "");
        assert!(state.headers.is_empty());
        assert_eq!(state.buffer.pos, 0);
        assert_eq!(&state.buffer.buf[..], b"abc");
    }
}
