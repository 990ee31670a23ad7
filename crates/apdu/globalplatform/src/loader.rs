//! Package installation
//!
//! Installing a package is three steps: INSTALL [for load], one LOAD per
//! block, then INSTALL [for install and make selectable]. The first refused
//! command stops the sequence.
//!
//! Nothing is rolled back. A refused LOAD or final INSTALL leaves the card
//! with a partially loaded package until it is deleted or the load is
//! repeated successfully.

use jcload_apdu_core::{ApduCommand, CardTransport};
use tracing::{debug, info, warn};

use crate::{
    Error, Phase, Result,
    application::GlobalPlatform,
    commands::{InstallCommand, LoadCommand, transmit},
    load::CapFile,
};

/// Progress reported after each acknowledged LOAD block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    /// Blocks acknowledged so far
    pub block: usize,
    /// Total number of blocks
    pub total: usize,
    /// Bytes of the load file acknowledged so far
    pub bytes_sent: usize,
    /// Length of the load file
    pub total_bytes: usize,
}

impl<T: CardTransport> GlobalPlatform<T> {
    /// Load and install the package in `cap`
    ///
    /// See the module documentation for what a failure leaves on the card.
    pub fn install(&mut self, cap: &CapFile) -> Result<()> {
        self.install_with_progress(cap, |_| {})
    }

    /// Same as [`install`](Self::install), reporting each acknowledged LOAD block
    pub fn install_with_progress<F>(&mut self, cap: &CapFile, mut progress: F) -> Result<()>
    where
        F: FnMut(LoadProgress),
    {
        self.ensure_authenticated()?;

        let total = cap.block_count();
        let total_bytes = cap.load_file().len();
        info!(
            package = %hex::encode_upper(cap.package_aid()),
            applet = %hex::encode_upper(cap.applet_aid()),
            blocks = total,
            "Installing package"
        );

        let command =
            InstallCommand::for_load(cap.package_aid(), &self.config().security_domain_aid)?;
        self.install_step(Phase::InstallForLoad, &command)?;

        let mut bytes_sent = 0;
        for block in cap.blocks() {
            let command = LoadCommand::new(block.number, block.last, block.data)?;
            self.install_step(Phase::Load(block.number), &command)?;

            bytes_sent += block.data.len();
            progress(LoadProgress {
                block: usize::from(block.number) + 1,
                total,
                bytes_sent,
                total_bytes,
            });
        }

        let command = InstallCommand::for_install_and_make_selectable(
            cap.package_aid(),
            cap.applet_aid(),
            cap.applet_aid(),
        )?;
        self.install_step(Phase::InstallForInstall, &command)?;

        info!(applet = %hex::encode_upper(cap.applet_aid()), "Applet installed");
        Ok(())
    }

    fn install_step<C: ApduCommand>(&mut self, phase: Phase, command: &C) -> Result<()> {
        let response = transmit(&mut self.transport, phase, command)?;
        if !response.is_success() {
            warn!(
                phase = %phase,
                status = %response.status(),
                "Installation aborted, card may hold a partial load"
            );
            return Err(Error::Install {
                phase,
                status: response.status(),
            });
        }

        debug!(phase = %phase, "Accepted");
        Ok(())
    }
}
