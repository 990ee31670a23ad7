//! DELETE command for GlobalPlatform
//!
//! Removes an applet instance together with its related objects.

use bytes::Bytes;
use jcload_apdu_core::{ApduBuffer, ApduCommand, CommandError};

use crate::constants::{cla, delete_p2, ins, tags};

/// DELETE command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCommand {
    p2: u8,
    data: Bytes,
}

impl DeleteCommand {
    fn with_aid(aid: &[u8], p2: u8) -> Result<Self, CommandError> {
        let mut data = ApduBuffer::for_data();
        data.put_u8(tags::AID)?;
        data.put_length_prefixed(aid)?;

        Ok(Self {
            p2,
            data: data.freeze(),
        })
    }

    /// Delete an object only
    pub fn delete_object(aid: &[u8]) -> Result<Self, CommandError> {
        Self::with_aid(aid, delete_p2::OBJECT)
    }

    /// Delete an object and related objects
    pub fn delete_object_and_related(aid: &[u8]) -> Result<Self, CommandError> {
        Self::with_aid(aid, delete_p2::OBJECT_AND_RELATED)
    }
}

impl ApduCommand for DeleteCommand {
    fn class(&self) -> u8 {
        cla::GP
    }

    fn instruction(&self) -> u8 {
        ins::DELETE
    }

    fn p1(&self) -> u8 {
        0x00
    }

    fn p2(&self) -> u8 {
        self.p2
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.data)
    }

    fn expected_length(&self) -> Option<u8> {
        None
    }
}
