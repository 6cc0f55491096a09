use crate::constants;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use std::convert::TryFrom;

/// Strips leading and trailing spaces, tabs, CRs and LFs.
pub fn trim(bytes: &[u8]) -> &[u8] {
    let start = match bytes.iter().position(|b| !constants::WHITESPACE.contains(b)) {
        Some(idx) => idx,
        None => return &[],
    };

    let end = bytes
        .iter()
        .rposition(|b| !constants::WHITESPACE.contains(b))
        .map_or(start, |idx| idx + 1);

    &bytes[start..end]
}

/// Splits a header line on its first `:` into a trimmed `(tag, value)` pair.
///
/// Returns `None` when the line has no `:` at all. Either side may come back
/// empty; callers skip such lines.
pub fn split_tag_value(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let idx = memchr::memchr(b':', line)?;
    Some((trim(&line[..idx]), trim(&line[idx + 1..])))
}

/// ASCII-only case-insensitive comparison, as legacy HTTP header matching does.
pub fn eq_ignore_ascii_case(a: &[u8], b: &[u8]) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Records a part header in `headers`. Lines that don't form a valid
/// [`HeaderName`]/[`HeaderValue`] are kept out of the map.
pub(crate) fn append_raw_header(headers: &mut HeaderMap, tag: &[u8], value: &[u8]) -> bool {
    let name = match HeaderName::try_from(tag) {
        Ok(name) => name,
        Err(_) => return false,
    };

    let value = match HeaderValue::try_from(value) {
        Ok(value) => value,
        Err(_) => return false,
    };

    headers.append(name, value);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim() {
        assert_eq!(trim(b"  image/jpeg\r\n"), b"image/jpeg");
        assert_eq!(trim(b"\tContent-Length "), b"Content-Length");
        assert_eq!(trim(b"a b"), b"a b");
        assert_eq!(trim(b" \t\r\n"), b"");
        assert_eq!(trim(b""), b"");
    }

    #[test]
    fn test_split_tag_value() {
        let tests: [(&[u8], &[u8], &[u8]); 5] = [
            (b"Content-Type: image/jpeg", b"Content-Type", b"image/jpeg"),
            (b"Content-Length:40669", b"Content-Length", b"40669"),
            (b"X-Timestamp : 1550567095.266 ", b"X-Timestamp", b"1550567095.266"),
            (b"X-Time: 12:30:00", b"X-Time", b"12:30:00"),
            (b"X-Empty:", b"X-Empty", b""),
        ];

        for (line, exp_tag, exp_value) in tests.iter() {
            let (tag, value) = split_tag_value(line).expect("split header line");
            assert_eq!(&tag, exp_tag);
            assert_eq!(&value, exp_value);
        }

        assert_eq!(split_tag_value(b": value"), Some((&b""[..], &b"value"[..])));
        assert_eq!(split_tag_value(b"X-Custom"), None);
        assert_eq!(split_tag_value(b""), None);
    }

    #[test]
    fn test_eq_ignore_ascii_case() {
        assert!(eq_ignore_ascii_case(b"Content-Type", b"content-type"));
        assert!(eq_ignore_ascii_case(b"IMAGE/JPEG", b"image/jpeg"));
        assert!(!eq_ignore_ascii_case(b"image/jpeg", b"image/jpg"));
        assert!(!eq_ignore_ascii_case(b"image/png", b"image/png "));
        // Non-ASCII bytes only match themselves.
        assert!(!eq_ignore_ascii_case("É".as_bytes(), "é".as_bytes()));
    }

    #[test]
    fn test_append_raw_header() {
        let mut headers = HeaderMap::new();

        assert!(append_raw_header(&mut headers, b"X-Frame", b"1"));
        assert!(append_raw_header(&mut headers, b"x-frame", b"2"));
        assert!(!append_raw_header(&mut headers, b"Bad Name", b"3"));
        assert!(!append_raw_header(&mut headers, b"X-Value", b"a\nb"));

        let frames: Vec<_> = headers.get_all("x-frame").iter().collect();
        assert_eq!(frames, vec!["1", "2"]);
        assert_eq!(headers.len(), 2);
    }
}
