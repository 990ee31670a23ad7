//! Error types for GlobalPlatform operations

use derive_more::Display;
use jcload_apdu_core::{CommandError, StatusWord, TransportError};
use thiserror::Error;

/// Result type for GlobalPlatform operations
pub type Result<T> = std::result::Result<T, Error>;

/// Step of a card management exchange, used to report where a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Phase {
    /// Selecting the security domain
    #[display("SELECT")]
    Select,
    /// Sending the host challenge
    #[display("INITIALIZE UPDATE")]
    InitializeUpdate,
    /// Sending the host cryptogram
    #[display("EXTERNAL AUTHENTICATE")]
    ExternalAuthenticate,
    /// Announcing the load file
    #[display("INSTALL [for load]")]
    InstallForLoad,
    /// Sending one load file data block
    #[display("LOAD block {_0}")]
    Load(u8),
    /// Creating and enabling the applet instance
    #[display("INSTALL [for install and make selectable]")]
    InstallForInstall,
    /// Reading the registry
    #[display("GET STATUS")]
    GetStatus,
    /// Removing an applet
    #[display("DELETE")]
    Delete,
}

/// Reasons a mutual authentication is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationError {
    /// The card cryptogram does not match the one derived from the static key
    #[error("card cryptogram mismatch")]
    CardCryptogram,

    /// The card refused the host cryptogram
    #[error("EXTERNAL AUTHENTICATE rejected with status {0}")]
    Rejected(StatusWord),
}

/// Errors raised while reading a CAP file
#[derive(Debug, Error)]
pub enum PackageError {
    /// The archive could not be opened or read
    #[error("cannot read CAP archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O error while reading a component
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required component is absent
    #[error("missing component {0}")]
    MissingComponent(&'static str),

    /// A component is too short for the fields read from it
    #[error("malformed {0} component")]
    Malformed(&'static str),

    /// The Applet component does not declare exactly one applet
    #[error("package declares {0} applets, only single-applet packages are supported")]
    AppletCount(u8),

    /// The load file data block length cannot be encoded
    #[error("load file of {0} bytes is too large")]
    TooLarge(usize),

    /// The load file needs more blocks than a one-byte block number can address
    #[error("load file needs {0} LOAD blocks, at most 256 are supported")]
    TooManyBlocks(usize),
}

/// Error type for GlobalPlatform operations
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-related errors
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Command encoding errors
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Response had an unexpected length or shape
    #[error("{phase}: malformed response ({reason})")]
    Protocol {
        /// Exchange that produced the response
        phase: Phase,
        /// What was wrong with it
        reason: &'static str,
    },

    /// Card answered a non-install command with a failure status
    #[error("{phase} failed with status {status} ({})", status.description())]
    UnexpectedStatus {
        /// Exchange that failed
        phase: Phase,
        /// Status word returned by the card
        status: StatusWord,
    },

    /// Mutual authentication failed
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthenticationError),

    /// CAP file could not be turned into a load file
    #[error(transparent)]
    Package(#[from] PackageError),

    /// An INSTALL or LOAD command was refused; the card may hold a partial load
    #[error("{phase} failed with status {status} ({})", status.description())]
    Install {
        /// Exchange that failed
        phase: Phase,
        /// Status word returned by the card
        status: StatusWord,
    },

    /// DELETE was refused
    #[error("DELETE of {aid} failed with status {status} ({})", status.description())]
    Delete {
        /// AID in hex
        aid: String,
        /// Status word returned by the card
        status: StatusWord,
    },

    /// An operation required an authenticated secure channel
    #[error("Secure channel not established")]
    NoSecureChannel,

    /// A secure channel step was attempted out of order
    #[error("secure channel is {actual}, expected {expected}")]
    InvalidState {
        /// State the step requires
        expected: crate::ChannelState,
        /// State the channel is in
        actual: crate::ChannelState,
    },

    /// Caller supplied output buffer is too small
    #[error("buffer too small: {needed} bytes needed, {available} available")]
    BufferTooSmall {
        /// Bytes required
        needed: usize,
        /// Bytes provided
        available: usize,
    },
}

impl Error {
    /// Status word returned by the card, when the failure came from one
    pub fn status(&self) -> Option<StatusWord> {
        match self {
            Self::UnexpectedStatus { status, .. }
            | Self::Install { status, .. }
            | Self::Delete { status, .. }
            | Self::Authentication(AuthenticationError::Rejected(status)) => Some(*status),
            _ => None,
        }
    }

    /// Phase the failure belongs to, when known
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Protocol { phase, .. }
            | Self::UnexpectedStatus { phase, .. }
            | Self::Install { phase, .. } => Some(*phase),
            Self::Delete { .. } => Some(Phase::Delete),
            _ => None,
        }
    }
}
