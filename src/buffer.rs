use bytes::{Buf, BytesMut};
use memchr::memmem;

/// Append-only byte accumulator with a read cursor.
///
/// Everything before `pos` has been handed out and is never read again.
/// [`compact`](StreamBuffer::compact) is the only operation that drops bytes.
#[derive(Debug)]
pub(crate) struct StreamBuffer {
    pub(crate) buf: BytesMut,
    pub(crate) pos: usize,
}

impl StreamBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        StreamBuffer {
            buf: BytesMut::with_capacity(capacity),
            pos: 0,
        }
    }

    pub fn append(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Returns the bytes between the cursor and the first occurrence of
    /// `pattern`, moving the cursor past the pattern. Leaves the cursor
    /// untouched if the pattern is not buffered yet.
    pub fn read_until(&mut self, pattern: &[u8]) -> Option<&[u8]> {
        let start = self.pos;
        let idx = memmem::find(&self.buf[start..], pattern)?;

        self.pos = start + idx + pattern.len();
        Some(&self.buf[start..start + idx])
    }

    pub fn read_exact(&mut self, size: usize) -> Option<&[u8]> {
        let start = self.pos;

        if size <= self.remaining() {
            self.pos += size;
            Some(&self.buf[start..start + size])
        } else {
            None
        }
    }

    /// Drops the consumed prefix and resets the cursor.
    pub fn compact(&mut self) {
        self.buf.advance(self.pos);
        self.pos = 0;
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}
