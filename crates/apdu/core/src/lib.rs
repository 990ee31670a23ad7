//! Core traits and types for APDU (Application Protocol Data Unit) operations
//!
//! This crate provides the foundational types and traits for working with smart card
//! APDU commands and responses according to ISO/IEC 7816-4.
//!
//! ## Overview
//!
//! APDU (Application Protocol Data Unit) is the communication format used by smart cards.
//! This crate provides abstractions for:
//!
//! - Building short (case 1-4) command APDUs through a length-checked buffer
//! - Splitting responses into payload and status word
//! - Communicating with smart cards through different transport layers
//!
//! Transports are stateless per call: they move bytes and never interpret status
//! words, leaving protocol state to the layers above.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

// Main modules
pub mod buffer;
pub mod command;
pub mod response;
pub mod transport;

// Re-exports for common types
pub use buffer::ApduBuffer;
pub use command::{ApduCommand, Command, CommandError};
pub use response::error::ResponseError;
pub use response::status::StatusWord;
pub use response::Response;
pub use transport::{CardTransport, TransportError};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        ApduBuffer, Bytes, BytesMut, Command, CommandError, Response, ResponseError,
        command::ApduCommand,
        response::status::StatusWord,
        transport::{CardTransport, TransportError},
    };
}
