/// Initial capacity of the demuxer buffer, enough for a typical VGA JPEG frame.
pub(crate) const DEFAULT_BUFFER_CAP: usize = 35000;

pub(crate) const MAX_HEADERS: usize = 32;
pub(crate) const BOUNDARY_EXT: &str = "--";
pub(crate) const BOUNDARY_PARAM: &str = "boundary=";
pub(crate) const CRLF: &str = "\r\n";

/// Bytes stripped by [`trim`](crate::helpers::trim).
pub(crate) const WHITESPACE: &[u8] = b" \t\r\n";
