//! Bounded formatting buffer
//!
//! `core::fmt` does the actual formatting; this only provides the fixed
//! destination. Anything that does not fit is discarded, and the writer
//! never reports an error, so a long line is cut rather than lost.

use core::fmt::{self, Write};

/// Capacity of one formatted console write
pub const FORMAT_BUFFER_SIZE: usize = 320;

/// Fixed-capacity byte buffer that truncates silently
pub struct BoundedBuffer<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> BoundedBuffer<N> {
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    /// Render `args` into the buffer, returning the rendered length
    pub fn render(&mut self, args: fmt::Arguments) -> usize {
        // write_str never fails, so neither does write_fmt
        let _ = self.write_fmt(args);
        self.len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for BoundedBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Write for BoundedBuffer<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = N - self.len;
        let take = s.len().min(room);
        self.bytes[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}
