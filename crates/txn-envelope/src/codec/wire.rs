//! Low-level field reader and writer for transaction bodies.

use crate::error::{DecodeError, EncodeError};
use shared_types::HANDLE_LEN;

const FLAG_ABSENT: u8 = 0;
const FLAG_PRESENT: u8 = 1;

/// Appends fields to a transaction body.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a 16-byte handle.
    pub fn put_handle(&mut self, bytes: &[u8; HANDLE_LEN]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write a presence flag.
    pub fn put_flag(&mut self, present: bool) {
        self.buf.push(if present { FLAG_PRESENT } else { FLAG_ABSENT });
    }

    /// Write a `u32` count.
    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write the tag of a present field. The empty tag is reserved for
    /// `put_absent_tag`.
    pub fn put_tag(&mut self, tag: &str) -> Result<(), EncodeError> {
        if tag.is_empty() {
            return Err(EncodeError::EmptyTag);
        }
        let len = u16::try_from(tag.len()).map_err(|_| EncodeError::TagTooLong { len: tag.len() })?;
        self.buf.extend_from_slice(&len.to_le_bytes());
        self.buf.extend_from_slice(tag.as_bytes());
        Ok(())
    }

    /// Mark an absent polymorphic field.
    pub fn put_absent_tag(&mut self) {
        self.buf.extend_from_slice(&0u16.to_le_bytes());
    }

    /// Write a length-prefixed payload.
    pub fn put_payload(&mut self, payload: &[u8]) -> Result<(), EncodeError> {
        let len = u32::try_from(payload.len()).map_err(|_| EncodeError::EnvelopeTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        })?;
        self.put_u32(len);
        self.buf.extend_from_slice(payload);
        Ok(())
    }

    /// Bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finish the body, refusing it if it grew past `max` bytes.
    pub fn finish(self, max: usize) -> Result<Vec<u8>, EncodeError> {
        if self.buf.len() > max {
            return Err(EncodeError::EnvelopeTooLarge {
                size: self.buf.len(),
                max,
            });
        }
        Ok(self.buf)
    }
}

/// Reads fields from a transaction body.
///
/// Every read is bounds-checked; malformed input yields a [`DecodeError`].
#[derive(Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Start reading at the beginning of `buf`.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::UnexpectedEof {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a 16-byte handle.
    pub fn get_handle(&mut self) -> Result<[u8; HANDLE_LEN], DecodeError> {
        let mut bytes = [0u8; HANDLE_LEN];
        bytes.copy_from_slice(self.take(HANDLE_LEN)?);
        Ok(bytes)
    }

    /// Read a presence flag. Anything other than `0` or `1` is rejected.
    pub fn get_flag(&mut self) -> Result<bool, DecodeError> {
        let offset = self.pos;
        match self.take(1)?[0] {
            FLAG_ABSENT => Ok(false),
            FLAG_PRESENT => Ok(true),
            value => Err(DecodeError::InvalidFlag { offset, value }),
        }
    }

    /// Read a `u32` count.
    pub fn get_u32(&mut self) -> Result<u32, DecodeError> {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(bytes))
    }

    /// Read a tag. Returns `None` for the empty (absent) tag.
    pub fn get_tag(&mut self) -> Result<Option<&'a str>, DecodeError> {
        let mut len = [0u8; 2];
        len.copy_from_slice(self.take(2)?);
        let len = u16::from_le_bytes(len) as usize;
        if len == 0 {
            return Ok(None);
        }

        let offset = self.pos;
        let raw = self.take(len)?;
        std::str::from_utf8(raw)
            .map(Some)
            .map_err(|_| DecodeError::InvalidTag { offset })
    }

    /// Read a length-prefixed payload no longer than `max` bytes.
    pub fn get_payload(&mut self, max: usize) -> Result<&'a [u8], DecodeError> {
        let len = self.get_u32()? as usize;
        if len > max {
            return Err(DecodeError::LengthLimit { len, max });
        }
        self.take(len)
    }

    /// Require that the whole input was consumed.
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            count => Err(DecodeError::TrailingBytes { count }),
        }
    }
}
