//! GlobalPlatform command definitions
//!
//! Each command is a small typed builder implementing [`ApduCommand`]; the
//! byte layout lives with the builder and is checked by its tests.

use jcload_apdu_core::{ApduCommand, CardTransport, Response};
use tracing::debug;

use crate::{Error, Phase, Result};

// Submodules
pub mod delete;
pub mod external_authenticate;
pub mod get_status;
pub mod initialize_update;
pub mod install;
pub mod load;
pub mod select;

// Re-exports for convenience
pub use delete::DeleteCommand;
pub use external_authenticate::ExternalAuthenticateCommand;
pub use get_status::GetStatusCommand;
pub use initialize_update::{InitializeUpdateCommand, InitializeUpdateResponse};
pub use install::InstallCommand;
pub use load::LoadCommand;
pub use select::{SelectCommand, SelectResponse};

/// Encode `command`, send it and split the answer into payload and status
///
/// The status word is not interpreted here.
pub(crate) fn transmit<T, C>(transport: &mut T, phase: Phase, command: &C) -> Result<Response>
where
    T: CardTransport + ?Sized,
    C: ApduCommand,
{
    let raw = transport.transmit_raw(&command.to_bytes()?)?;
    let response = Response::from_bytes(&raw).map_err(|_| Error::Protocol {
        phase,
        reason: "response shorter than a status word",
    })?;

    debug!(phase = %phase, status = %response.status(), "Card responded");
    Ok(response)
}
