//! GET STATUS command for GlobalPlatform
//!
//! Reads the applications part of the card registry.

use jcload_apdu_core::ApduCommand;

use crate::constants::{cla, get_status_p1, get_status_p2, ins, tags};

/// Search criteria: tag 4F with an empty value matches every AID
const MATCH_ALL: [u8; 2] = [tags::AID, 0x00];

/// GET STATUS for applications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetStatusCommand {
    p2: u8,
}

impl GetStatusCommand {
    /// First (or only) part of the listing
    pub const fn applications() -> Self {
        Self {
            p2: get_status_p2::FIRST,
        }
    }

    /// Continue a listing after the card answered 63 10
    pub const fn next_applications() -> Self {
        Self {
            p2: get_status_p2::NEXT,
        }
    }
}

impl ApduCommand for GetStatusCommand {
    fn class(&self) -> u8 {
        cla::GP
    }

    fn instruction(&self) -> u8 {
        ins::GET_STATUS
    }

    fn p1(&self) -> u8 {
        get_status_p1::APPLICATIONS
    }

    fn p2(&self) -> u8 {
        self.p2
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&MATCH_ALL)
    }

    fn expected_length(&self) -> Option<u8> {
        Some(0x00)
    }
}
