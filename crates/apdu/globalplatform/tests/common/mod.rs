//! Shared fixtures for the integration tests
//!
//! [`SimulatedCard`] plays the card manager side of SCP02 with the crate's own
//! primitives, keeps an applet registry and records every command it receives.

#![allow(dead_code, unreachable_pub, missing_docs)]

use std::io::{Cursor, Write};

use cipher::{Iv, Key};
use jcload_apdu_core::{Bytes, CardTransport, Command, TransportError};
use jcload_globalplatform::{
    CapFile, GlobalPlatform, GpConfig, HostChallenge, Keys,
    crypto::{
        CardChallenge, Scp02, SequenceCounter, DERIVATION_ENC, DERIVATION_MAC,
        calculate_cryptogram, derive_key, mac_full_3des,
    },
};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

pub const DEFAULT_KEY: [u8; 16] = [
    0x40, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0x4A, 0x4B, 0x4C, 0x4D, 0x4E, 0x4F,
];
pub const ISD_AID: [u8; 8] = [0xA0, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00];
pub const PACKAGE_AID: [u8; 7] = [0xA0, 0x00, 0x00, 0x05, 0x27, 0x10, 0x01];
pub const APPLET_AID: [u8; 8] = [0xA0, 0x00, 0x00, 0x05, 0x27, 0x10, 0x01, 0x01];

/// Values from a recorded session with the default key
pub const HOST_CHALLENGE: [u8; 8] = [0xf0, 0x46, 0x7f, 0x90, 0x8e, 0x5c, 0xa2, 0x3f];
pub const SEQUENCE_COUNTER: SequenceCounter = [0x00, 0x0d];
pub const CARD_CHALLENGE: CardChallenge = [0xe9, 0xc6, 0x2b, 0xa1, 0xc4, 0xc8];
pub const KEY_DIVERSIFICATION: [u8; 10] =
    [0x00, 0x00, 0x02, 0x65, 0x01, 0x83, 0x03, 0x95, 0x36, 0x62];

const SW_OK: [u8; 2] = [0x90, 0x00];
const SW_MORE_DATA: [u8; 2] = [0x63, 0x10];
const SW_AUTH_FAILED: [u8; 2] = [0x63, 0x00];
const SW_SECURITY: [u8; 2] = [0x69, 0x82];
const SW_CONDITIONS: [u8; 2] = [0x69, 0x85];
const SW_NOT_FOUND: [u8; 2] = [0x6A, 0x82];
const SW_NO_DATA: [u8; 2] = [0x6A, 0x88];
const SW_WRONG_P1P2: [u8; 2] = [0x6A, 0x86];
const SW_INS: [u8; 2] = [0x6D, 0x00];

/// An instance in the simulated registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installed {
    pub aid: Vec<u8>,
    pub package: Vec<u8>,
}

/// A load in progress
#[derive(Debug, Clone, Default)]
struct PendingLoad {
    package: Vec<u8>,
    next_block: u8,
    data: Vec<u8>,
    complete: bool,
}

/// Card manager simulation
#[derive(Debug)]
pub struct SimulatedCard {
    key: Key<Scp02>,
    card_challenge: CardChallenge,
    sequence_counter: SequenceCounter,
    selected: bool,
    session: Option<(Key<Scp02>, Key<Scp02>, [u8; 8])>,
    authenticated: bool,
    pending: Option<PendingLoad>,
    next_entry: usize,
    /// Load file data blocks received in full, by package AID
    pub loaded: Vec<(Vec<u8>, Vec<u8>)>,
    /// Installed applet instances
    pub registry: Vec<Installed>,
    /// Every command APDU received
    pub commands: Vec<Vec<u8>>,
    /// Entries per GET STATUS response before `63 10`
    pub page_size: usize,
    /// Flip a bit of the card cryptogram
    pub corrupt_cryptogram: bool,
    /// Answer the matching (INS, P2) with this status instead of processing it
    pub fail_on: Option<(u8, Option<u8>, [u8; 2])>,
}

impl SimulatedCard {
    pub fn new() -> Self {
        Self::with_key(DEFAULT_KEY)
    }

    pub fn with_key(key: [u8; 16]) -> Self {
        Self {
            key: Key::<Scp02>::from(key),
            card_challenge: CARD_CHALLENGE,
            sequence_counter: SEQUENCE_COUNTER,
            selected: false,
            session: None,
            authenticated: false,
            pending: None,
            next_entry: 0,
            loaded: Vec::new(),
            registry: Vec::new(),
            commands: Vec::new(),
            page_size: usize::MAX,
            corrupt_cryptogram: false,
            fail_on: None,
        }
    }

    pub fn with_applet(mut self, aid: &[u8]) -> Self {
        self.registry.push(Installed {
            aid: aid.to_vec(),
            package: PACKAGE_AID.to_vec(),
        });
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Commands received with the given instruction byte
    pub fn commands_with_ins(&self, ins: u8) -> Vec<&Vec<u8>> {
        self.commands
            .iter()
            .filter(|command| command.get(1) == Some(&ins))
            .collect()
    }

    fn respond(&mut self, command: &Command) -> Vec<u8> {
        if let Some((ins, p2, status)) = self.fail_on {
            if command.ins == ins && p2.is_none_or(|p2| p2 == command.p2) {
                return status.to_vec();
            }
        }

        let data = command.data.as_deref().unwrap_or_default();
        match (command.cla, command.ins) {
            (0x00, 0xA4) => self.select(data),
            (0x80, 0x50) => self.initialize_update(data),
            (0x84, 0x82) => self.external_authenticate(command, data),
            _ if !self.authenticated => SW_SECURITY.to_vec(),
            (0x80, 0xE6) => self.install(command.p1, data),
            (0x80, 0xE8) => self.load(command.p1, command.p2, data),
            (0x80, 0xF2) => self.get_status(command.p2),
            (0x80, 0xE4) => self.delete(data),
            _ => SW_INS.to_vec(),
        }
    }

    fn select(&mut self, aid: &[u8]) -> Vec<u8> {
        self.session = None;
        self.authenticated = false;
        self.selected = aid == ISD_AID;
        if !self.selected {
            return SW_NOT_FOUND.to_vec();
        }

        let mut response = vec![0x6F, 0x10, 0x84, 0x08];
        response.extend_from_slice(&ISD_AID);
        response.extend_from_slice(&[0xA5, 0x04, 0x9F, 0x65, 0x01, 0xFF]);
        response.extend_from_slice(&SW_OK);
        response
    }

    fn initialize_update(&mut self, data: &[u8]) -> Vec<u8> {
        self.authenticated = false;
        let Ok(host_challenge) = <[u8; 8]>::try_from(data) else {
            return vec![0x67, 0x00];
        };
        if !self.selected {
            return SW_INS.to_vec();
        }

        let enc = derive_key(&self.key, &self.sequence_counter, &DERIVATION_ENC);
        let mac = derive_key(&self.key, &self.sequence_counter, &DERIVATION_MAC);
        let mut cryptogram = calculate_cryptogram(
            &enc,
            &self.sequence_counter,
            &self.card_challenge,
            &host_challenge,
            false,
        );
        if self.corrupt_cryptogram {
            cryptogram[7] ^= 0x01;
        }
        self.session = Some((enc, mac, host_challenge));

        let mut response = KEY_DIVERSIFICATION.to_vec();
        response.extend_from_slice(&[0x20, 0x02]);
        response.extend_from_slice(&self.sequence_counter);
        response.extend_from_slice(&self.card_challenge);
        response.extend_from_slice(&cryptogram);
        response.extend_from_slice(&SW_OK);
        response
    }

    fn external_authenticate(&mut self, command: &Command, data: &[u8]) -> Vec<u8> {
        let Some((enc, mac, host_challenge)) = self.session.take() else {
            return SW_CONDITIONS.to_vec();
        };
        if data.len() != 16 {
            return vec![0x67, 0x00];
        }

        let expected = calculate_cryptogram(
            &enc,
            &self.sequence_counter,
            &self.card_challenge,
            &host_challenge,
            true,
        );
        let mut mac_data = vec![command.cla, command.ins, command.p1, command.p2, 0x10];
        mac_data.extend_from_slice(&data[..8]);
        let expected_mac = mac_full_3des(&mac, &Iv::<Scp02>::default(), &mac_data);

        if data[..8] != expected || data[8..] != expected_mac {
            return SW_AUTH_FAILED.to_vec();
        }

        self.authenticated = true;
        SW_OK.to_vec()
    }

    fn install(&mut self, p1: u8, data: &[u8]) -> Vec<u8> {
        let fields = length_prefixed_fields(data);
        match p1 {
            0x02 => {
                let [package, security_domain, ..] = fields.as_slice() else {
                    return SW_WRONG_P1P2.to_vec();
                };
                if *security_domain != ISD_AID {
                    return SW_NOT_FOUND.to_vec();
                }
                self.pending = Some(PendingLoad {
                    package: package.to_vec(),
                    ..PendingLoad::default()
                });
                SW_OK.to_vec()
            }
            0x0C => {
                let [package, _module, instance, ..] = fields.as_slice() else {
                    return SW_WRONG_P1P2.to_vec();
                };
                let Some(pending) = self.pending.take() else {
                    return SW_CONDITIONS.to_vec();
                };
                if !pending.complete || pending.package != *package {
                    return SW_CONDITIONS.to_vec();
                }
                self.loaded.push((pending.package.clone(), pending.data));
                self.registry.push(Installed {
                    aid: instance.to_vec(),
                    package: pending.package,
                });
                SW_OK.to_vec()
            }
            _ => SW_WRONG_P1P2.to_vec(),
        }
    }

    fn load(&mut self, p1: u8, p2: u8, data: &[u8]) -> Vec<u8> {
        let Some(pending) = self.pending.as_mut() else {
            return SW_CONDITIONS.to_vec();
        };
        if pending.complete || p2 != pending.next_block {
            return SW_WRONG_P1P2.to_vec();
        }

        pending.data.extend_from_slice(data);
        pending.next_block = pending.next_block.wrapping_add(1);
        pending.complete = p1 == 0x80;
        vec![0x00, 0x90, 0x00]
    }

    fn get_status(&mut self, p2: u8) -> Vec<u8> {
        if self.registry.is_empty() {
            return SW_NO_DATA.to_vec();
        }

        let offset = if p2 == 0x01 { self.next_entry } else { 0 };
        self.next_entry = offset.saturating_add(self.page_size);

        let mut response = Vec::new();
        let page = self.registry.iter().skip(offset).take(self.page_size);
        for entry in page {
            response.push(entry.aid.len() as u8);
            response.extend_from_slice(&entry.aid);
            response.extend_from_slice(&[0x07, 0x00]);
        }

        if self.next_entry < self.registry.len() {
            response.extend_from_slice(&SW_MORE_DATA);
        } else {
            response.extend_from_slice(&SW_OK);
        }
        response
    }

    fn delete(&mut self, data: &[u8]) -> Vec<u8> {
        let [0x4F, length, aid @ ..] = data else {
            return SW_WRONG_P1P2.to_vec();
        };
        if usize::from(*length) != aid.len() {
            return SW_WRONG_P1P2.to_vec();
        }

        let before = self.registry.len();
        self.registry.retain(|entry| entry.aid != aid);
        if self.registry.len() == before {
            return SW_NO_DATA.to_vec();
        }
        vec![0x00, 0x90, 0x00]
    }
}

impl CardTransport for SimulatedCard {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.commands.push(command.to_vec());
        let parsed = Command::from_bytes(command).map_err(|_| TransportError::Transmission)?;
        Ok(Bytes::from(self.respond(&parsed)))
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        self.selected = false;
        self.session = None;
        self.authenticated = false;
        Ok(())
    }
}

fn length_prefixed_fields(mut data: &[u8]) -> Vec<&[u8]> {
    let mut fields = Vec::new();
    while let [length, rest @ ..] = data {
        let Some((field, rest)) = rest.split_at_checked(usize::from(*length)) else {
            break;
        };
        fields.push(field);
        data = rest;
    }
    fields
}

/// Configuration reproducing the recorded session
pub fn fixed_config() -> GpConfig {
    GpConfig::default().with_host_challenge(HostChallenge::Fixed(HOST_CHALLENGE))
}

/// Authenticated instance over `card`
pub fn authenticated(card: SimulatedCard) -> GlobalPlatform<SimulatedCard> {
    let mut gp = GlobalPlatform::with_config(card, Keys::default(), fixed_config());
    gp.authenticate().expect("authentication with the default key");
    gp.transport_mut().commands.clear();
    gp
}

/// Header component declaring `PACKAGE_AID`
pub fn header_component() -> Vec<u8> {
    let mut header = vec![
        0x01, 0x00, 0x11, 0xDE, 0xCA, 0xFF, 0xED, 0x01, 0x02, 0x04, 0x00, 0x01, 0x07,
    ];
    header.extend_from_slice(&PACKAGE_AID);
    header
}

/// Applet component declaring `count` applets, the first being `APPLET_AID`
pub fn applet_component(count: u8) -> Vec<u8> {
    let mut applet = vec![0x03, 0x00, 0x0C, count, 0x08];
    applet.extend_from_slice(&APPLET_AID);
    applet.extend_from_slice(&[0x00, 0x20]);
    for index in 1..count {
        applet.push(0x08);
        applet.extend_from_slice(&APPLET_AID[..7]);
        applet.push(index + 1);
        applet.extend_from_slice(&[0x00, 0x40]);
    }
    applet
}

/// The nine load components, with Method padded so the sizes add up to `total`
pub fn components_with_total(total: usize) -> Vec<(&'static str, Vec<u8>)> {
    let header = header_component();
    let applet = applet_component(1);
    let fixed = header.len() + applet.len() + 6 * 3;
    assert!(total >= fixed, "total must cover the fixed components");

    let mut method = vec![0x07, 0x00, 0x00];
    method.resize(total - fixed, 0x5A);

    vec![
        ("Header", header),
        ("Directory", vec![0x02, 0x00, 0x00]),
        ("Import", vec![0x04, 0x00, 0x00]),
        ("Applet", applet),
        ("Class", vec![0x06, 0x00, 0x00]),
        ("Method", method),
        ("StaticField", vec![0x08, 0x00, 0x00]),
        ("ConstantPool", vec![0x05, 0x00, 0x00]),
        ("RefLocation", vec![0x09, 0x00, 0x00]),
    ]
}

/// Zip components under a converter-style package path
pub fn cap_archive(components: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    writer.start_file("META-INF/MANIFEST.MF", options).unwrap();
    writer.write_all(b"Manifest-Version: 1.0\n").unwrap();
    for (name, data) in components {
        writer
            .start_file(format!("com/example/wallet/javacard/{name}.cap"), options)
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Parse an in-memory CAP archive
pub fn cap_file(components: &[(&str, Vec<u8>)]) -> CapFile {
    CapFile::from_reader(Cursor::new(cap_archive(components))).unwrap()
}
