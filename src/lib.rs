//! An incremental demuxer for `multipart/x-mixed-replace` image streams in Rust.
//!
//! Camera feeds served as MJPEG (or MPNG) send an endless multipart body, one
//! image per part. [`Demuxer`] consumes that body in arbitrarily split chunks
//! and hands every complete image to a callback, together with its declared
//! content type.
//!
//! The demuxer is synchronous and never spawns anything. The callback runs
//! inline inside [`Demuxer::feed`], so a slow consumer naturally throttles how
//! fast the transport is asked for more bytes. The [`transport`] module wires
//! it to byte streams, async readers and raw HTTP response heads.
//!
//! # Examples
//!
//! ```
//! use multipart_demux::{Constraints, Demuxer, Progress};
//! use std::ops::ControlFlow;
//!
//! // The body opens with `--frame` and no leading CRLF.
//! let content_type = "multipart/x-mixed-replace; boundary=\"frame\"";
//! let constraints = Constraints::new().skip_opening_delimiter(true);
//! let mut demuxer = Demuxer::with_constraints(content_type, constraints).unwrap();
//!
//! let chunks: [&[u8]; 3] = [
//!     b"--frame\r\nContent-Type: image/jpeg\r\nContent-Le",
//!     b"ngth: 4\r\n\r\n\xff\xd8\xff",
//!     b"\xd9\r\n--frame\r\n",
//! ];
//!
//! for chunk in chunks.iter() {
//!     let progress = demuxer
//!         .feed(chunk, |part| {
//!             println!("{} bytes of {}", part.len(), part.content_type());
//!             ControlFlow::Continue(())
//!         })
//!         .unwrap();
//!
//!     assert_eq!(progress, Progress::NeedMoreData);
//! }
//!
//! assert_eq!(demuxer.stats().parts_emitted, 1);
//! ```

pub use bytes;

pub use constraints::Constraints;
pub use demuxer::{Demuxer, Stats};
pub use error::Error;
pub use part::Part;
pub use state::{DemuxStage, Progress};

mod buffer;
mod constants;
mod constraints;
mod demuxer;
mod error;
pub mod helpers;
mod part;
mod state;
pub mod transport;

/// A Result type often returned from methods that can have `multipart-demux` errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Parses the `Content-Type` header value to extract the boundary token.
///
/// Every `;`-separated parameter after the media type is checked for a
/// case-insensitive `boundary=` prefix. The first match wins and runs to the
/// next `;`. A token wrapped in double quotes has them stripped. The media
/// type itself is not checked.
pub fn parse_boundary<T: AsRef<str>>(content_type: T) -> crate::Result<String> {
    let mut rest = content_type.as_ref();
    let param = constants::BOUNDARY_PARAM;

    while let Some(idx) = rest.find(';') {
        rest = rest[idx + 1..].trim_start_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));

        let is_boundary = rest
            .as_bytes()
            .get(..param.len())
            .map_or(false, |prefix| helpers::eq_ignore_ascii_case(prefix, param.as_bytes()));

        if !is_boundary {
            continue;
        }

        let mut value = &rest[param.len()..];
        if let Some(end) = value.find(';') {
            value = &value[..end];
        }

        if value.len() > 2 && value.starts_with('"') && value.ends_with('"') {
            value = &value[1..value.len() - 1];
        }

        return if value.is_empty() {
            Err(crate::Error::NoBoundary)
        } else {
            Ok(value.to_owned())
        };
    }

    Err(crate::Error::NoBoundary)
}
