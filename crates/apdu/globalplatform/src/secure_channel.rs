//! SCP02 secure channel establishment
//!
//! [`SecureChannel`] walks the card's security domain through SELECT,
//! INITIALIZE UPDATE and EXTERNAL AUTHENTICATE, and holds the resulting
//! [`Session`] once both sides have proven knowledge of the static keys.
//!
//! Commands sent after authentication are not wrapped: the channel is opened
//! with security level `00`, so only EXTERNAL AUTHENTICATE carries a C-MAC.

use derive_more::Display;
use jcload_apdu_core::CardTransport;
use tracing::{debug, info, warn};

use crate::{
    AuthenticationError, Error, Phase, Result,
    commands::{
        ExternalAuthenticateCommand, InitializeUpdateCommand, InitializeUpdateResponse,
        SelectCommand, SelectResponse, transmit,
    },
    config::{GpConfig, SecurityLevel},
    constants::scp,
    crypto::Challenge,
    session::{Keys, Session},
};

/// Progress of the mutual authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum ChannelState {
    /// Nothing selected yet
    #[default]
    #[display("unselected")]
    Unselected,
    /// Security domain selected
    #[display("selected")]
    Selected,
    /// Card cryptogram verified, session keys derived
    #[display("initialized")]
    Initialized,
    /// EXTERNAL AUTHENTICATE accepted
    #[display("authenticated")]
    Authenticated,
    /// A step failed; the channel must be re-established from SELECT
    #[display("failed")]
    Failed,
}

/// SCP02 channel state machine
#[derive(Debug, Default)]
pub struct SecureChannel {
    state: ChannelState,
    session: Option<Session>,
}

impl SecureChannel {
    /// Create an unselected channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub const fn state(&self) -> ChannelState {
        self.state
    }

    /// Whether EXTERNAL AUTHENTICATE has been accepted
    pub fn is_authenticated(&self) -> bool {
        self.state == ChannelState::Authenticated
    }

    /// Session of the current authentication attempt
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Forget the session and return to [`ChannelState::Unselected`]
    pub fn reset(&mut self) {
        self.session = None;
        self.state = ChannelState::Unselected;
    }

    fn fail(&mut self) {
        self.session = None;
        self.state = ChannelState::Failed;
    }

    fn check<R>(&mut self, result: Result<R>) -> Result<R> {
        if result.is_err() {
            self.fail();
        }
        result
    }

    fn expect_state(&self, expected: ChannelState) -> Result<()> {
        if self.state != expected {
            return Err(Error::InvalidState {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    /// Select the security domain
    ///
    /// Allowed from any state; a previous session is discarded first.
    pub fn select<T>(&mut self, transport: &mut T, aid: &[u8]) -> Result<SelectResponse>
    where
        T: CardTransport + ?Sized,
    {
        self.reset();

        let result = transmit(transport, Phase::Select, &SelectCommand::by_name(aid)).and_then(
            |response| {
                if response.is_success() {
                    Ok(SelectResponse::from_response(&response))
                } else {
                    Err(Error::UnexpectedStatus {
                        phase: Phase::Select,
                        status: response.status(),
                    })
                }
            },
        );
        let response = self.check(result)?;

        debug!(aid = %hex::encode_upper(aid), "Security domain selected");
        self.state = ChannelState::Selected;
        Ok(response)
    }

    /// Send the host challenge, derive session keys and verify the card cryptogram
    pub fn initialize_update<T>(
        &mut self,
        transport: &mut T,
        keys: &Keys,
        host_challenge: Challenge,
    ) -> Result<()>
    where
        T: CardTransport + ?Sized,
    {
        self.expect_state(ChannelState::Selected)?;

        let command = InitializeUpdateCommand::with_challenge(host_challenge);
        let result = transmit(transport, Phase::InitializeUpdate, &command)
            .and_then(|response| InitializeUpdateResponse::from_response(&response))
            .and_then(|response| {
                if response.key_info()[1] != scp::SCP02 {
                    warn!(
                        key_info = %hex::encode_upper(response.key_info()),
                        "Card does not announce SCP02"
                    );
                }
                Session::new(keys, &response, host_challenge)
            });
        let session = self.check(result)?;

        debug!(?session, "Card cryptogram verified");
        self.session = Some(session);
        self.state = ChannelState::Initialized;
        Ok(())
    }

    /// Send the host cryptogram under a C-MAC
    pub fn external_authenticate<T>(
        &mut self,
        transport: &mut T,
        security_level: SecurityLevel,
    ) -> Result<()>
    where
        T: CardTransport + ?Sized,
    {
        self.expect_state(ChannelState::Initialized)?;

        let command = match &self.session {
            Some(session) => ExternalAuthenticateCommand::new(
                security_level.p1(),
                &session.host_cryptogram(),
                &session.mac(),
            ),
            None => return Err(Error::NoSecureChannel),
        };

        let result = transmit(transport, Phase::ExternalAuthenticate, &command).and_then(
            |response| {
                if response.is_success() {
                    Ok(())
                } else {
                    Err(AuthenticationError::Rejected(response.status()).into())
                }
            },
        );
        self.check(result)?;

        self.state = ChannelState::Authenticated;
        Ok(())
    }

    /// Run the whole handshake with a fresh host challenge from `config`
    pub fn establish<T>(&mut self, transport: &mut T, keys: &Keys, config: &GpConfig) -> Result<()>
    where
        T: CardTransport + ?Sized,
    {
        self.select(transport, &config.security_domain_aid)?;
        self.initialize_update(transport, keys, config.host_challenge.generate())?;
        self.external_authenticate(transport, config.security_level)?;

        info!("Secure channel established");
        Ok(())
    }
}
