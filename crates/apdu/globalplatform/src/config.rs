//! Session configuration

use rand::RngCore;
use tracing::warn;

use crate::constants::SECURITY_DOMAIN_AID;

/// How the 8-byte host challenge for INITIALIZE UPDATE is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostChallenge {
    /// Fresh random bytes for every session
    #[default]
    Random,
    /// The same bytes every session, for cards configured around a fixed challenge
    Fixed([u8; 8]),
}

impl HostChallenge {
    /// Produce the challenge for the next INITIALIZE UPDATE
    pub fn generate(&self) -> [u8; 8] {
        match self {
            Self::Random => {
                let mut challenge = [0u8; 8];
                rand::rng().fill_bytes(&mut challenge);
                challenge
            }
            Self::Fixed(challenge) => {
                warn!("Using a fixed host challenge, session is open to replay");
                *challenge
            }
        }
    }
}

/// Protection applied to commands after EXTERNAL AUTHENTICATE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityLevel {
    /// Only EXTERNAL AUTHENTICATE carries a MAC
    #[default]
    None,
}

impl SecurityLevel {
    /// P1 of EXTERNAL AUTHENTICATE
    pub const fn p1(self) -> u8 {
        match self {
            Self::None => 0x00,
        }
    }
}

/// Configuration for a GlobalPlatform session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpConfig {
    /// AID of the security domain to select and load into
    pub security_domain_aid: Vec<u8>,
    /// Host challenge policy
    pub host_challenge: HostChallenge,
    /// EXTERNAL AUTHENTICATE security level
    pub security_level: SecurityLevel,
}

impl Default for GpConfig {
    fn default() -> Self {
        Self {
            security_domain_aid: SECURITY_DOMAIN_AID.to_vec(),
            host_challenge: HostChallenge::Random,
            security_level: SecurityLevel::None,
        }
    }
}

impl GpConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the security domain AID
    pub fn with_security_domain_aid(mut self, aid: impl Into<Vec<u8>>) -> Self {
        self.security_domain_aid = aid.into();
        self
    }

    /// Set the host challenge policy
    pub const fn with_host_challenge(mut self, host_challenge: HostChallenge) -> Self {
        self.host_challenge = host_challenge;
        self
    }

    /// Set the EXTERNAL AUTHENTICATE security level
    pub const fn with_security_level(mut self, security_level: SecurityLevel) -> Self {
        self.security_level = security_level;
        self
    }
}
