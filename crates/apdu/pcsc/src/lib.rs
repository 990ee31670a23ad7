//! PC/SC transport implementation for APDU operations
//!
//! This crate provides an implementation of the `CardTransport` trait from
//! `jcload-apdu-core` using the PC/SC API for communication with smart cards.
//!
//! # Examples
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use jcload_apdu_core::{ApduCommand, CardTransport, Command};
//! use jcload_transport_pcsc::{PcscConfig, PcscDeviceManager};
//!
//! let manager = PcscDeviceManager::new()?;
//! let mut transport = manager.open_first_with_card(PcscConfig::default().with_trace(true))?;
//!
//! let select = Command::new_with_data(0x00, 0xA4, 0x04, 0x00, vec![0xA0, 0, 0, 0, 3, 0, 0, 0]);
//! let response = transport.transmit_raw(&select.to_bytes()?)?;
//! println!("{}", hex::encode(response));
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(missing_docs)]

mod config;
mod error;
mod manager;
mod reader;
mod transport;

pub use config::{PcscConfig, ShareMode};
pub use error::PcscError;
pub use manager::PcscDeviceManager;
pub use reader::PcscReader;
pub use transport::PcscTransport;

// Re-export some pcsc types for convenience
pub use pcsc::{Protocol, Protocols};
