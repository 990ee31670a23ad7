//! LOAD command for GlobalPlatform
//!
//! Carries one block of the load file data block.

use bytes::Bytes;
use jcload_apdu_core::{ApduCommand, CommandError, buffer::MAX_DATA_LENGTH};

use crate::constants::{cla, ins, load_p1};

/// LOAD command for one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadCommand {
    last: bool,
    block_number: u8,
    data: Bytes,
}

impl LoadCommand {
    /// Create a LOAD for block `block_number`, flagged as last when `last` is set
    pub fn new(block_number: u8, last: bool, block: &[u8]) -> Result<Self, CommandError> {
        if block.len() > MAX_DATA_LENGTH {
            return Err(CommandError::data_too_long(block.len(), MAX_DATA_LENGTH));
        }

        Ok(Self {
            last,
            block_number,
            data: Bytes::copy_from_slice(block),
        })
    }

    /// Whether this is the final block
    pub const fn is_last(&self) -> bool {
        self.last
    }
}

impl ApduCommand for LoadCommand {
    fn class(&self) -> u8 {
        cla::GP
    }

    fn instruction(&self) -> u8 {
        ins::LOAD
    }

    fn p1(&self) -> u8 {
        if self.last {
            load_p1::LAST_BLOCK
        } else {
            load_p1::MORE_BLOCKS
        }
    }

    fn p2(&self) -> u8 {
        self.block_number
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.data)
    }

    fn expected_length(&self) -> Option<u8> {
        None
    }
}
