//! INITIALIZE UPDATE command for GlobalPlatform
//!
//! Opens an SCP02 session by exchanging challenges with the card.

use jcload_apdu_core::{ApduCommand, Response};

use crate::constants::{INITIALIZE_UPDATE_RESPONSE_LENGTH, cla, ins};
use crate::crypto::{CardChallenge, Challenge, Cryptogram, SequenceCounter};
use crate::{Error, Phase, Result};

/// INITIALIZE UPDATE carrying the host challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeUpdateCommand {
    host_challenge: Challenge,
}

impl InitializeUpdateCommand {
    /// Create the command for key version 0 with the given host challenge
    pub const fn with_challenge(host_challenge: Challenge) -> Self {
        Self { host_challenge }
    }
}

impl ApduCommand for InitializeUpdateCommand {
    fn class(&self) -> u8 {
        cla::GP
    }

    fn instruction(&self) -> u8 {
        ins::INITIALIZE_UPDATE
    }

    fn p1(&self) -> u8 {
        0x00
    }

    fn p2(&self) -> u8 {
        0x00
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.host_challenge)
    }

    fn expected_length(&self) -> Option<u8> {
        None
    }
}

/// Card data returned by INITIALIZE UPDATE
///
/// ```text
/// 0..10   key diversification data
/// 10..12  key information
/// 12..14  sequence counter
/// 14..20  card challenge
/// 20..28  card cryptogram
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeUpdateResponse {
    key_diversification_data: [u8; 10],
    key_info: [u8; 2],
    sequence_counter: SequenceCounter,
    card_challenge: CardChallenge,
    card_cryptogram: Cryptogram,
}

impl InitializeUpdateResponse {
    /// Split a successful 30-byte response into its fields
    pub fn from_response(response: &Response) -> Result<Self> {
        if !response.is_success() {
            return Err(Error::UnexpectedStatus {
                phase: Phase::InitializeUpdate,
                status: response.status(),
            });
        }

        let data = response.payload().unwrap_or_default();
        if data.len() + 2 != INITIALIZE_UPDATE_RESPONSE_LENGTH {
            return Err(Error::Protocol {
                phase: Phase::InitializeUpdate,
                reason: "expected 28 bytes of card data",
            });
        }

        let mut parsed = Self {
            key_diversification_data: [0; 10],
            key_info: [0; 2],
            sequence_counter: [0; 2],
            card_challenge: [0; 6],
            card_cryptogram: [0; 8],
        };
        parsed.key_diversification_data.copy_from_slice(&data[0..10]);
        parsed.key_info.copy_from_slice(&data[10..12]);
        parsed.sequence_counter.copy_from_slice(&data[12..14]);
        parsed.card_challenge.copy_from_slice(&data[14..20]);
        parsed.card_cryptogram.copy_from_slice(&data[20..28]);
        Ok(parsed)
    }

    /// Key diversification data
    pub const fn key_diversification_data(&self) -> &[u8; 10] {
        &self.key_diversification_data
    }

    /// Key version number and SCP identifier
    pub const fn key_info(&self) -> &[u8; 2] {
        &self.key_info
    }

    /// Sequence counter
    pub const fn sequence_counter(&self) -> &SequenceCounter {
        &self.sequence_counter
    }

    /// Card challenge
    pub const fn card_challenge(&self) -> &CardChallenge {
        &self.card_challenge
    }

    /// Card cryptogram
    pub const fn card_cryptogram(&self) -> &Cryptogram {
        &self.card_cryptogram
    }
}
