//! SELECT command for GlobalPlatform
//!
//! Selects the security domain by AID.

use bytes::Bytes;
use jcload_apdu_core::{ApduCommand, Response};

use crate::constants::{cla, ins, select_p1, tags};
use crate::util::tlv;

/// SELECT by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectCommand {
    aid: Bytes,
}

impl SelectCommand {
    /// Select an application or security domain by AID
    pub fn by_name(aid: impl AsRef<[u8]>) -> Self {
        Self {
            aid: Bytes::copy_from_slice(aid.as_ref()),
        }
    }
}

impl ApduCommand for SelectCommand {
    fn class(&self) -> u8 {
        cla::ISO7816
    }

    fn instruction(&self) -> u8 {
        ins::SELECT
    }

    fn p1(&self) -> u8 {
        select_p1::BY_NAME
    }

    fn p2(&self) -> u8 {
        0x00
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.aid)
    }

    fn expected_length(&self) -> Option<u8> {
        None
    }
}

/// File control information returned by a successful SELECT
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectResponse {
    fci: Bytes,
}

impl SelectResponse {
    /// Keep the payload of a successful SELECT
    pub fn from_response(response: &Response) -> Self {
        Self {
            fci: response
                .payload()
                .map(Bytes::copy_from_slice)
                .unwrap_or_default(),
        }
    }

    /// Raw FCI bytes
    pub fn fci(&self) -> &[u8] {
        &self.fci
    }

    /// AID the card reports for the selected security domain (tag 84 in the FCI)
    pub fn security_domain_aid(&self) -> Option<Bytes> {
        let template = tlv::find_tlv_value(&self.fci, tags::FCI_TEMPLATE)?;
        tlv::find_tlv_value(&template, tags::DF_NAME)
    }
}
