//! Applet registry: listing and deletion
//!
//! GET STATUS for applications answers with one record per applet:
//!
//! ```text
//! len | AID (len bytes) | life cycle state | privileges
//! ```

use std::fmt;

use jcload_apdu_core::CardTransport;
use tracing::{debug, info};

use crate::{
    Error, Phase, Result,
    application::GlobalPlatform,
    commands::{DeleteCommand, GetStatusCommand, transmit},
};

/// One applet from the card registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppletEntry {
    /// Applet instance AID
    pub aid: Vec<u8>,
    /// Life cycle state byte
    pub life_cycle: u8,
    /// Privileges byte
    pub privileges: u8,
}

impl AppletEntry {
    /// AID as uppercase hex
    pub fn aid_hex(&self) -> String {
        hex::encode_upper(&self.aid)
    }
}

impl fmt::Display for AppletEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (life cycle {:02X}, privileges {:02X})",
            self.aid_hex(),
            self.life_cycle,
            self.privileges
        )
    }
}

/// Split a GET STATUS payload into registry entries
pub fn parse_entries(mut data: &[u8]) -> Result<Vec<AppletEntry>> {
    let mut entries = Vec::new();

    while let [length, rest @ ..] = data {
        let length = usize::from(*length);
        let Some((aid, rest)) = rest.split_at_checked(length) else {
            return Err(truncated());
        };
        let [life_cycle, privileges, rest @ ..] = rest else {
            return Err(truncated());
        };

        entries.push(AppletEntry {
            aid: aid.to_vec(),
            life_cycle: *life_cycle,
            privileges: *privileges,
        });
        data = rest;
    }

    Ok(entries)
}

const fn truncated() -> Error {
    Error::Protocol {
        phase: Phase::GetStatus,
        reason: "truncated registry entry",
    }
}

/// Write the listing as newline-terminated hex AIDs
///
/// With `out` set to `None` nothing is written and the required length is
/// returned, so callers can size the buffer first.
pub fn write_listing(entries: &[AppletEntry], out: Option<&mut [u8]>) -> Result<usize> {
    let needed = entries.iter().map(|entry| entry.aid.len() * 2 + 1).sum();
    let Some(out) = out else {
        return Ok(needed);
    };

    if out.len() < needed {
        return Err(Error::BufferTooSmall {
            needed,
            available: out.len(),
        });
    }

    let mut position = 0;
    for entry in entries {
        let end = position + entry.aid.len() * 2;
        // The target slice is exactly twice the AID length
        hex::encode_to_slice(&entry.aid, &mut out[position..end])
            .map_err(|_| Error::BufferTooSmall {
                needed,
                available: end,
            })?;
        out[position..end].make_ascii_uppercase();
        out[end] = b'\n';
        position = end + 1;
    }

    Ok(needed)
}

impl<T: CardTransport> GlobalPlatform<T> {
    /// Read every applet from the card registry
    ///
    /// Follows `63 10` with further GET STATUS requests. `6A 88` means the
    /// registry holds no applets.
    pub fn list(&mut self) -> Result<Vec<AppletEntry>> {
        self.ensure_authenticated()?;

        let mut entries = Vec::new();
        let mut command = GetStatusCommand::applications();
        loop {
            let response = transmit(&mut self.transport, Phase::GetStatus, &command)?;
            let status = response.status();

            if status.is_referenced_data_not_found() {
                break;
            }
            if !status.is_success() && !status.is_more_data_available() {
                return Err(Error::UnexpectedStatus {
                    phase: Phase::GetStatus,
                    status,
                });
            }

            let payload = response.payload().unwrap_or_default();
            entries.extend(parse_entries(payload)?);

            if status.is_success() {
                break;
            }
            if payload.is_empty() {
                return Err(Error::Protocol {
                    phase: Phase::GetStatus,
                    reason: "more data announced without any entries",
                });
            }
            command = GetStatusCommand::next_applications();
        }

        debug!(count = entries.len(), "Registry read");
        Ok(entries)
    }

    /// Delete an applet instance and its related objects
    pub fn delete(&mut self, aid: &[u8]) -> Result<()> {
        self.ensure_authenticated()?;

        let command = DeleteCommand::delete_object_and_related(aid)?;
        let response = transmit(&mut self.transport, Phase::Delete, &command)?;
        if !response.is_success() {
            return Err(Error::Delete {
                aid: hex::encode_upper(aid),
                status: response.status(),
            });
        }

        info!(aid = %hex::encode_upper(aid), "Deleted");
        Ok(())
    }
}
