//! GlobalPlatform application interface
//!
//! [`GlobalPlatform`] owns one card connection for the lifetime of a card
//! session and serializes every exchange over it. Loading and registry
//! operations are implemented in [`crate::loader`] and [`crate::directory`].

use jcload_apdu_core::CardTransport;

use crate::{
    Error, Result,
    config::GpConfig,
    secure_channel::{ChannelState, SecureChannel},
    session::{Keys, Session},
};

/// GlobalPlatform card management over one transport
#[derive(Debug)]
pub struct GlobalPlatform<T: CardTransport> {
    pub(crate) transport: T,
    keys: Keys,
    config: GpConfig,
    channel: SecureChannel,
}

impl<T: CardTransport> GlobalPlatform<T> {
    /// Create an instance with the default configuration
    pub fn new(transport: T, keys: Keys) -> Self {
        Self::with_config(transport, keys, GpConfig::default())
    }

    /// Create an instance with an explicit configuration
    pub fn with_config(transport: T, keys: Keys, config: GpConfig) -> Self {
        Self {
            transport,
            keys,
            config,
            channel: SecureChannel::new(),
        }
    }

    /// Open the SCP02 secure channel
    ///
    /// Any earlier session is discarded before the new handshake starts, so a
    /// failed re-authentication leaves no usable session behind.
    pub fn authenticate(&mut self) -> Result<()> {
        self.channel
            .establish(&mut self.transport, &self.keys, &self.config)
    }

    /// Fail with [`Error::NoSecureChannel`] unless authenticated
    pub(crate) fn ensure_authenticated(&self) -> Result<()> {
        if self.channel.is_authenticated() {
            Ok(())
        } else {
            Err(Error::NoSecureChannel)
        }
    }

    /// Current secure channel state
    pub const fn channel_state(&self) -> ChannelState {
        self.channel.state()
    }

    /// Session of the current secure channel, if any
    pub const fn session(&self) -> Option<&Session> {
        self.channel.session()
    }

    /// Active configuration
    pub const fn config(&self) -> &GpConfig {
        &self.config
    }

    /// Drop the secure channel without touching the card
    pub fn close(&mut self) {
        self.channel.reset();
    }

    /// Underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Underlying transport, mutably
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give back the transport
    pub fn into_transport(self) -> T {
        self.transport
    }
}
