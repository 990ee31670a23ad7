//! APDU response definitions
//!
//! A response is split into an optional payload and the trailing status word.
//! Success is decided by the status word alone, whatever data precedes it.

pub mod error;
pub mod status;

use bytes::Bytes;
use tracing::trace;

use error::ResponseError;
use status::StatusWord;

/// Basic APDU response structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response payload data
    payload: Option<Bytes>,
    /// Status word
    status: StatusWord,
}

impl Response {
    /// Parse response from raw bytes (including status word)
    pub fn from_bytes(data: &[u8]) -> Result<Self, ResponseError> {
        let Some(split) = data.len().checked_sub(2) else {
            return Err(ResponseError::Incomplete(data.len()));
        };

        let status = StatusWord::new(data[split], data[split + 1]);
        let payload = (split > 0).then(|| Bytes::copy_from_slice(&data[..split]));

        trace!(
            sw1 = format_args!("{:#04x}", status.sw1),
            sw2 = format_args!("{:#04x}", status.sw2),
            payload_len = split,
            "Parsed APDU response"
        );

        Ok(Self { payload, status })
    }

    /// Get the response payload, if any
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Get the status word
    pub const fn status(&self) -> StatusWord {
        self.status
    }

    /// Check if the response indicates success
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
