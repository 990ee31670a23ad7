//! Constants used in GlobalPlatform operations
//!
//! Class bytes, instruction codes, parameter values and tags for the commands
//! this crate sends.

/// GlobalPlatform command classes
pub mod cla {
    /// ISO7816 command class
    pub const ISO7816: u8 = 0x00;
    /// GlobalPlatform command class
    pub const GP: u8 = 0x80;
    /// GlobalPlatform command class with secure messaging (C-MAC)
    pub const MAC: u8 = 0x84;
}

/// GlobalPlatform instruction codes
pub mod ins {
    /// SELECT command
    pub const SELECT: u8 = 0xA4;
    /// INITIALIZE UPDATE command
    pub const INITIALIZE_UPDATE: u8 = 0x50;
    /// EXTERNAL AUTHENTICATE command
    pub const EXTERNAL_AUTHENTICATE: u8 = 0x82;
    /// DELETE command
    pub const DELETE: u8 = 0xE4;
    /// LOAD command
    pub const LOAD: u8 = 0xE8;
    /// INSTALL command
    pub const INSTALL: u8 = 0xE6;
    /// GET STATUS command
    pub const GET_STATUS: u8 = 0xF2;
}

/// Parameter values for SELECT command (P1)
pub mod select_p1 {
    /// Select by DF name
    pub const BY_NAME: u8 = 0x04;
}

/// Parameter values for INSTALL command (P1)
pub mod install_p1 {
    /// Install for load
    pub const FOR_LOAD: u8 = 0x02;
    /// Install for install
    pub const FOR_INSTALL: u8 = 0x04;
    /// Install for make selectable
    pub const FOR_MAKE_SELECTABLE: u8 = 0x08;
    /// Install for install and make selectable
    pub const FOR_INSTALL_AND_MAKE_SELECTABLE: u8 = FOR_INSTALL | FOR_MAKE_SELECTABLE;
}

/// Parameter values for LOAD command (P1)
pub mod load_p1 {
    /// More blocks to follow
    pub const MORE_BLOCKS: u8 = 0x00;
    /// Last block
    pub const LAST_BLOCK: u8 = 0x80;
}

/// Parameter values for GET STATUS command (P1)
pub mod get_status_p1 {
    /// Get status of applications and security domains
    pub const APPLICATIONS: u8 = 0x40;
}

/// Parameter values for GET STATUS command (P2)
pub mod get_status_p2 {
    /// First or all occurrences
    pub const FIRST: u8 = 0x00;
    /// Next occurrences, after the card answered 63 10
    pub const NEXT: u8 = 0x01;
}

/// Parameter values for DELETE command (P2)
pub mod delete_p2 {
    /// Delete object
    pub const OBJECT: u8 = 0x00;
    /// Delete object and related objects
    pub const OBJECT_AND_RELATED: u8 = 0x80;
}

/// Tags used in GlobalPlatform commands and responses
pub mod tags {
    /// AID tag for DELETE and GET STATUS
    pub const AID: u8 = 0x4F;
    /// Load file data block tag
    pub const LOAD_FILE_DATA_BLOCK: u8 = 0xC4;
    /// File control information template
    pub const FCI_TEMPLATE: u8 = 0x6F;
    /// DF name inside the FCI
    pub const DF_NAME: u8 = 0x84;
    /// Application specific install parameters
    pub const APPLICATION_PARAMETERS: u8 = 0xC9;
}

/// Secure Channel Protocol (SCP) versions
pub mod scp {
    /// SCP02 protocol version
    pub const SCP02: u8 = 0x02;
}

/// Default security domain AID
pub const SECURITY_DOMAIN_AID: [u8; 8] = [0xA0, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00];

/// GlobalPlatform test key shipped on development cards
pub const DEFAULT_KEY: [u8; 16] = [
    0x40, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0x4A, 0x4B, 0x4C, 0x4D, 0x4E, 0x4F,
];

/// Install parameters sent with INSTALL [for install]: an empty C9 value
pub const INSTALL_PARAMETERS: [u8; 3] = [tags::APPLICATION_PARAMETERS, 0x01, 0x00];

/// Privileges granted to installed applets
pub const DEFAULT_PRIVILEGES: u8 = 0x00;

/// Length of the INITIALIZE UPDATE response including the status word
pub const INITIALIZE_UPDATE_RESPONSE_LENGTH: usize = 30;
