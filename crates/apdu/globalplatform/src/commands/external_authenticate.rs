//! EXTERNAL AUTHENTICATE command for GlobalPlatform
//!
//! Sends the host cryptogram, protected by the SCP02 command MAC.

use cipher::{Iv, Key};
use jcload_apdu_core::ApduCommand;

use crate::constants::{cla, ins};
use crate::crypto::{Cryptogram, Scp02, mac_full_3des};

/// Length of the data field: host cryptogram and MAC
const DATA_LENGTH: u8 = 16;

/// EXTERNAL AUTHENTICATE with C-MAC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalAuthenticateCommand {
    security_level: u8,
    data: [u8; DATA_LENGTH as usize],
}

impl ExternalAuthenticateCommand {
    /// Build the command and compute its MAC
    ///
    /// The MAC covers the header with the secure messaging class and the final
    /// Lc, followed by the host cryptogram, and starts from a zero ICV.
    pub fn new(security_level: u8, host_cryptogram: &Cryptogram, mac_key: &Key<Scp02>) -> Self {
        let mut mac_data = [0u8; 13];
        mac_data[..5].copy_from_slice(&[
            cla::MAC,
            ins::EXTERNAL_AUTHENTICATE,
            security_level,
            0x00,
            DATA_LENGTH,
        ]);
        mac_data[5..].copy_from_slice(host_cryptogram);

        let mac = mac_full_3des(mac_key, &Iv::<Scp02>::default(), &mac_data);

        let mut data = [0u8; DATA_LENGTH as usize];
        data[..8].copy_from_slice(host_cryptogram);
        data[8..].copy_from_slice(&mac);

        Self {
            security_level,
            data,
        }
    }

    /// Host cryptogram carried by the command
    pub fn host_cryptogram(&self) -> &[u8] {
        &self.data[..8]
    }

    /// C-MAC carried by the command
    pub fn mac(&self) -> &[u8] {
        &self.data[8..]
    }
}

impl ApduCommand for ExternalAuthenticateCommand {
    fn class(&self) -> u8 {
        cla::MAC
    }

    fn instruction(&self) -> u8 {
        ins::EXTERNAL_AUTHENTICATE
    }

    fn p1(&self) -> u8 {
        self.security_level
    }

    fn p2(&self) -> u8 {
        0x00
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.data)
    }

    fn expected_length(&self) -> Option<u8> {
        None
    }
}
