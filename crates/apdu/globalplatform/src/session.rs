//! Session management for SCP02 secure channel
//!
//! This module provides the static key set and the Session type holding the
//! keys derived for one authenticated channel.

use std::fmt;

use cipher::Key;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    AuthenticationError, Result,
    commands::InitializeUpdateResponse,
    constants::DEFAULT_KEY,
    crypto::{
        CardChallenge, Challenge, Cryptogram, DERIVATION_ENC, DERIVATION_MAC, Scp02,
        SequenceCounter, calculate_cryptogram, derive_key,
    },
};

/// Static SCP02 keys shared with the card
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Keys {
    /// Encryption key
    enc: [u8; 16],
    /// MAC key
    mac: [u8; 16],
}

impl fmt::Debug for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys").finish_non_exhaustive()
    }
}

impl Default for Keys {
    fn default() -> Self {
        Self::from_single_key(DEFAULT_KEY)
    }
}

impl Keys {
    /// Create a new key set with the specified encryption and MAC keys
    pub const fn new(enc: [u8; 16], mac: [u8; 16]) -> Self {
        Self { enc, mac }
    }

    /// Create a new key set where both keys are the same
    pub const fn from_single_key(key: [u8; 16]) -> Self {
        Self { enc: key, mac: key }
    }

    /// Get the encryption key
    pub fn enc(&self) -> Key<Scp02> {
        Key::<Scp02>::from(self.enc)
    }

    /// Get the MAC key
    pub fn mac(&self) -> Key<Scp02> {
        Key::<Scp02>::from(self.mac)
    }
}

/// Session state for SCP02 secure channel
///
/// Keys and challenges are wiped when the session is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Session {
    /// Session encryption key
    enc: [u8; 16],
    /// Session MAC key
    mac: [u8; 16],
    host_challenge: Challenge,
    card_challenge: CardChallenge,
    sequence_counter: SequenceCounter,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("sequence_counter", &hex::encode(self.sequence_counter))
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Derive session keys and verify the card cryptogram
    ///
    /// Fails with [`AuthenticationError::CardCryptogram`] when the card did
    /// not prove knowledge of the static keys.
    pub fn new(
        keys: &Keys,
        response: &InitializeUpdateResponse,
        host_challenge: Challenge,
    ) -> Result<Self> {
        let sequence_counter = *response.sequence_counter();
        let card_challenge = *response.card_challenge();

        let session = Self {
            enc: derive_key(&keys.enc(), &sequence_counter, &DERIVATION_ENC).into(),
            mac: derive_key(&keys.mac(), &sequence_counter, &DERIVATION_MAC).into(),
            host_challenge,
            card_challenge,
            sequence_counter,
        };

        let expected = calculate_cryptogram(
            &session.enc(),
            &sequence_counter,
            &card_challenge,
            &host_challenge,
            false,
        );
        if expected != *response.card_cryptogram() {
            return Err(AuthenticationError::CardCryptogram.into());
        }

        Ok(session)
    }

    /// Cryptogram proving the host's knowledge of the static keys
    pub fn host_cryptogram(&self) -> Cryptogram {
        calculate_cryptogram(
            &self.enc(),
            &self.sequence_counter,
            &self.card_challenge,
            &self.host_challenge,
            true,
        )
    }

    /// Session encryption key
    pub fn enc(&self) -> Key<Scp02> {
        Key::<Scp02>::from(self.enc)
    }

    /// Session MAC key
    pub fn mac(&self) -> Key<Scp02> {
        Key::<Scp02>::from(self.mac)
    }

    /// Get the card challenge
    pub const fn card_challenge(&self) -> &CardChallenge {
        &self.card_challenge
    }

    /// Get the host challenge
    pub const fn host_challenge(&self) -> &Challenge {
        &self.host_challenge
    }

    /// Get the sequence counter
    pub const fn sequence_counter(&self) -> &SequenceCounter {
        &self.sequence_counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use hex_literal::hex;
    use jcload_apdu_core::Response;

    const INIT_RESPONSE: [u8; 30] =
        hex!("000002650183039536622002000de9c62ba1c4c8e55fcb91b6654ce49000");
    const HOST_CHALLENGE: Challenge = hex!("f0467f908e5ca23f");

    fn parse(raw: &[u8]) -> InitializeUpdateResponse {
        InitializeUpdateResponse::from_response(&Response::from_bytes(raw).unwrap()).unwrap()
    }

    #[test]
    fn test_session_new() {
        let session = Session::new(&Keys::default(), &parse(&INIT_RESPONSE), HOST_CHALLENGE)
            .unwrap();

        assert_eq!(session.sequence_counter(), &hex!("000d"));
        assert_eq!(session.card_challenge(), &hex!("e9c62ba1c4c8"));
        assert_eq!(session.host_challenge(), &HOST_CHALLENGE);
        assert_ne!(session.enc(), session.mac());
    }

    #[test]
    fn test_session_rejects_tampering() {
        // Flip one bit in the sequence counter, card challenge and cryptogram
        for offset in [13, 14, 19, 20, 27] {
            let mut raw = INIT_RESPONSE;
            raw[offset] ^= 0x01;
            let result = Session::new(&Keys::default(), &parse(&raw), HOST_CHALLENGE);
            assert!(
                matches!(
                    result,
                    Err(Error::Authentication(AuthenticationError::CardCryptogram))
                ),
                "offset {offset}"
            );
        }

        let mut host_challenge = HOST_CHALLENGE;
        host_challenge[0] ^= 0x80;
        assert!(Session::new(&Keys::default(), &parse(&INIT_RESPONSE), host_challenge).is_err());

        // Wrong K1, then wrong K2
        for key in [
            hex!("424142434445464748494a4b4c4d4e4f"),
            hex!("404142434445464748494a4b4c4d4e4d"),
        ] {
            let wrong_key = Keys::from_single_key(key);
            assert!(Session::new(&wrong_key, &parse(&INIT_RESPONSE), HOST_CHALLENGE).is_err());
        }
    }

    #[test]
    fn test_parity_bits_do_not_change_key() {
        // The low bit of each DES key byte is parity and takes no part in encryption
        let seq = hex!("000d");
        let parity_only = Keys::from_single_key(hex!("404142434445464748494a4b4c4d4e4e"));
        let effective = Keys::from_single_key(hex!("404142434445464748494a4b4c4d4e4d"));

        let reference = derive_key(&Keys::default().enc(), &seq, &DERIVATION_ENC);
        assert_eq!(derive_key(&parity_only.enc(), &seq, &DERIVATION_ENC), reference);
        assert_ne!(derive_key(&effective.enc(), &seq, &DERIVATION_ENC), reference);
    }

    #[test]
    fn test_keys_debug_is_redacted() {
        let keys = Keys::default();
        assert_eq!(format!("{keys:?}"), "Keys { .. }");
        assert_eq!(keys.enc(), keys.mac());
    }
}
