//! GlobalPlatform card management over an SCP02 secure channel
//!
//! This crate authenticates against a card's security domain with SCP02,
//! loads and installs Java Card packages from CAP files, and lists or deletes
//! installed applets.
//!
//! The main entry point is [`GlobalPlatform`], which owns a
//! [`CardTransport`](jcload_apdu_core::CardTransport) for the lifetime of a
//! card session.
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use jcload_globalplatform::{CapFile, GlobalPlatform, Keys};
//! use jcload_transport_pcsc::{PcscConfig, PcscDeviceManager};
//!
//! let manager = PcscDeviceManager::new()?;
//! let transport = manager.open_first_with_card(PcscConfig::default())?;
//!
//! let mut gp = GlobalPlatform::new(transport, Keys::default());
//! gp.authenticate()?;
//!
//! let cap = CapFile::open("applet.cap")?;
//! gp.install(&cap)?;
//!
//! for applet in gp.list()? {
//!     println!("{applet}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod commands;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod directory;
pub mod error;
pub mod load;
pub mod loader;
pub mod secure_channel;
pub mod session;
pub mod util;

#[cfg(test)]
mod testing;

// Re-exports
pub use application::GlobalPlatform;
pub use config::{GpConfig, HostChallenge, SecurityLevel};
pub use directory::AppletEntry;
pub use error::{AuthenticationError, Error, PackageError, Phase, Result};
pub use load::{CapFile, CapFileInfo, LoadBlock};
pub use loader::LoadProgress;
pub use secure_channel::{ChannelState, SecureChannel};
pub use session::{Keys, Session};

// Export main commands
pub use commands::{
    DeleteCommand, ExternalAuthenticateCommand, GetStatusCommand, InitializeUpdateCommand,
    InitializeUpdateResponse, InstallCommand, LoadCommand, SelectCommand, SelectResponse,
};
