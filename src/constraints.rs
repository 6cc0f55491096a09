use crate::helpers;

/// Represents which parts a [`Demuxer`](crate::Demuxer) forwards to its consumer,
/// and how strictly it reads part headers.
///
/// Parts are gated on their declared `Content-Type`. Anything outside the
/// allow-list is dropped and logged, never reported as an error.
///
/// # Examples
///
/// ```
/// use multipart_demux::Constraints;
///
/// let constraints = Constraints::new().allow_content_type(mime::IMAGE_GIF);
///
/// assert!(constraints.is_allowed("image/gif"));
/// assert!(constraints.is_allowed("IMAGE/JPEG"));
/// assert!(!constraints.is_allowed("text/plain"));
/// ```
#[derive(Debug, Clone)]
pub struct Constraints {
    pub(crate) allowed_content_types: Option<Vec<mime::Mime>>,
    pub(crate) skip_opening_delimiter: bool,
}

impl Constraints {
    /// Creates the default constraints, allowing `image/png` and `image/jpeg`.
    pub fn new() -> Constraints {
        Constraints::default()
    }

    /// Replaces the allow-list with the given content types.
    pub fn allowed_content_types<I>(mut self, allowed: I) -> Constraints
    where
        I: IntoIterator<Item = mime::Mime>,
    {
        self.allowed_content_types = Some(allowed.into_iter().collect());
        self
    }

    /// Adds a single content type to the allow-list.
    pub fn allow_content_type(mut self, allowed: mime::Mime) -> Constraints {
        self.allowed_content_types.get_or_insert_with(Vec::new).push(allowed);
        self
    }

    /// Forwards every part regardless of its declared content type.
    pub fn allow_any_content_type(mut self) -> Constraints {
        self.allowed_content_types = None;
        self
    }

    /// Skips a header line equal to `"--" boundary` instead of failing on it.
    ///
    /// Many servers open the body with the delimiter but without its leading
    /// CRLF, which otherwise reads as a malformed header line. Off by default.
    pub fn skip_opening_delimiter(mut self, skip: bool) -> Constraints {
        self.skip_opening_delimiter = skip;
        self
    }

    /// Checks a part's declared content type against the allow-list.
    ///
    /// The comparison is an exact, ASCII case-insensitive match on the whole
    /// value, parameters included.
    pub fn is_allowed(&self, content_type: &str) -> bool {
        match self.allowed_content_types {
            Some(ref allowed) => allowed
                .iter()
                .any(|m| helpers::eq_ignore_ascii_case(m.as_ref().as_bytes(), content_type.as_bytes())),
            None => true,
        }
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Constraints {
            allowed_content_types: Some(vec![mime::IMAGE_PNG, mime::IMAGE_JPEG]),
            skip_opening_delimiter: false,
        }
    }
}
