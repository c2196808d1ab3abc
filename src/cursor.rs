// ABOUTME: Bounds-checked cursors over the input message and the output buffer.
// ABOUTME: Input shortfalls report Malformed, output shortfalls report OutputExhausted.

use crate::error::{Error, Result};

/// Read cursor over the input message.
#[derive(Debug)]
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes not yet consumed.
    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// The byte at the cursor, if any.
    #[inline]
    pub(crate) fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// `len` bytes starting `offset` bytes past the cursor, without consuming.
    #[inline]
    pub(crate) fn peek_slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let start = self.pos.checked_add(offset).ok_or(Error::Malformed)?;
        let end = start.checked_add(len).ok_or(Error::Malformed)?;
        self.data.get(start..end).ok_or(Error::Malformed)
    }

    /// Consume `len` bytes.
    #[inline]
    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_slice(0, len)?;
        self.pos += len;
        Ok(bytes)
    }

    /// Skip `len` bytes.
    #[inline]
    pub(crate) fn advance(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }
}

/// Write cursor over the caller's output buffer.
#[derive(Debug)]
pub(crate) struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Capacity left after the write cursor.
    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Claim the next `len` bytes of the buffer and advance past them.
    #[inline]
    pub(crate) fn reserve(&mut self, len: usize) -> Result<&mut [u8]> {
        if len > self.remaining() {
            return Err(Error::OutputExhausted);
        }
        let start = self.pos;
        self.pos += len;
        Ok(&mut self.buf[start..start + len])
    }

    #[inline]
    pub(crate) fn put(&mut self, byte: u8) -> Result<()> {
        self.reserve(1)?[0] = byte;
        Ok(())
    }

    /// Bytes already written from `start` up to the cursor.
    #[inline]
    pub(crate) fn written_since(&mut self, start: usize) -> &mut [u8] {
        &mut self.buf[start..self.pos]
    }
}
