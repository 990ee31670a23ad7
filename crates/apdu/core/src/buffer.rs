//! Length-checked byte buffer for building APDUs
//!
//! Command layouts are assembled field by field. Instead of relying on a
//! caller-sized array, [`ApduBuffer`] owns a growable backing store with a hard
//! capacity and rejects any write that would cross it.

use bytes::{BufMut, Bytes, BytesMut};

use crate::command::CommandError;

/// Maximum length of a short command APDU: 5-byte header, 255 data bytes and Le
pub const MAX_COMMAND_LENGTH: usize = 5 + MAX_DATA_LENGTH + 1;

/// Maximum length of the data field of a short command APDU
pub const MAX_DATA_LENGTH: usize = 255;

/// Byte buffer with a fixed capacity and an explicit write cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduBuffer {
    buf: BytesMut,
    capacity: usize,
}

impl ApduBuffer {
    /// Create a buffer that accepts at most `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Create a buffer sized for a full short command APDU
    pub fn for_command() -> Self {
        Self::with_capacity(MAX_COMMAND_LENGTH)
    }

    /// Create a buffer sized for the data field of a short command APDU
    pub fn for_data() -> Self {
        Self::with_capacity(MAX_DATA_LENGTH)
    }

    /// Current cursor position, which is also the number of bytes written
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Number of bytes that can still be written
    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    /// Total capacity of the buffer
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether nothing has been written yet
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn reserve(&self, needed: usize) -> Result<(), CommandError> {
        if needed > self.remaining() {
            return Err(CommandError::BufferOverflow {
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Write a single byte at the cursor
    pub fn put_u8(&mut self, value: u8) -> Result<(), CommandError> {
        self.reserve(1)?;
        self.buf.put_u8(value);
        Ok(())
    }

    /// Write a slice at the cursor
    pub fn put_slice(&mut self, data: &[u8]) -> Result<(), CommandError> {
        self.reserve(data.len())?;
        self.buf.put_slice(data);
        Ok(())
    }

    /// Write a one-byte length followed by the value
    pub fn put_length_prefixed(&mut self, value: &[u8]) -> Result<(), CommandError> {
        let len = u8::try_from(value.len())
            .map_err(|_| CommandError::DataTooLong(value.len(), u8::MAX as usize))?;
        self.reserve(1 + value.len())?;
        self.buf.put_u8(len);
        self.buf.put_slice(value);
        Ok(())
    }

    /// View the bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the buffer and return the written bytes
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}
