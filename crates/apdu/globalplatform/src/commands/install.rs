//! INSTALL command for GlobalPlatform
//!
//! Only the two roles needed to load and instantiate a single-applet package
//! are built here.

use bytes::Bytes;
use jcload_apdu_core::{ApduBuffer, ApduCommand, CommandError};

use crate::constants::{DEFAULT_PRIVILEGES, INSTALL_PARAMETERS, cla, ins, install_p1};

/// INSTALL command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCommand {
    p1: u8,
    data: Bytes,
}

impl InstallCommand {
    /// INSTALL [for load]: announce the package and the security domain
    ///
    /// Data: `len pkg | len sd | 00 (hash) | 00 (params) | 00 (token)`.
    pub fn for_load(package_aid: &[u8], security_domain_aid: &[u8]) -> Result<Self, CommandError> {
        let mut data = ApduBuffer::for_data();
        data.put_length_prefixed(package_aid)?;
        data.put_length_prefixed(security_domain_aid)?;
        data.put_slice(&[0x00, 0x00, 0x00])?;

        Ok(Self {
            p1: install_p1::FOR_LOAD,
            data: data.freeze(),
        })
    }

    /// INSTALL [for install and make selectable]
    ///
    /// Data: `len pkg | len module | len instance | len privileges | len params | 00 (token)`.
    pub fn for_install_and_make_selectable(
        package_aid: &[u8],
        module_aid: &[u8],
        instance_aid: &[u8],
    ) -> Result<Self, CommandError> {
        let mut data = ApduBuffer::for_data();
        data.put_length_prefixed(package_aid)?;
        data.put_length_prefixed(module_aid)?;
        data.put_length_prefixed(instance_aid)?;
        data.put_length_prefixed(&[DEFAULT_PRIVILEGES])?;
        data.put_length_prefixed(&INSTALL_PARAMETERS)?;
        data.put_u8(0x00)?;

        Ok(Self {
            p1: install_p1::FOR_INSTALL_AND_MAKE_SELECTABLE,
            data: data.freeze(),
        })
    }
}

impl ApduCommand for InstallCommand {
    fn class(&self) -> u8 {
        cla::GP
    }

    fn instruction(&self) -> u8 {
        ins::INSTALL
    }

    fn p1(&self) -> u8 {
        self.p1
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
