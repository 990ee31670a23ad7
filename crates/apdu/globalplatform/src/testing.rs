//! Scripted transport for unit tests

use std::collections::VecDeque;

use jcload_apdu_core::{Bytes, CardTransport, TransportError};

/// Replays canned responses and records every command
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    responses: VecDeque<Bytes>,
    pub(crate) sent: Vec<Vec<u8>>,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: &[&[u8]]) -> Self {
        Self {
            responses: responses
                .iter()
                .map(|response| Bytes::copy_from_slice(response))
                .collect(),
            sent: Vec::new(),
        }
    }
}

impl CardTransport for ScriptedTransport {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.sent.push(command.to_vec());
        self.responses
            .pop_front()
            .ok_or(TransportError::Transmission)
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Package AID written into generated Header components
pub(crate) const PACKAGE_AID: [u8; 7] = [0xA0, 0x00, 0x00, 0x05, 0x27, 0x10, 0x01];

/// Applet AID written into generated Applet components
pub(crate) const APPLET_AID: [u8; 8] = [0xA0, 0x00, 0x00, 0x05, 0x27, 0x10, 0x01, 0x01];

/// Nine components whose sizes add up to `total` bytes
///
/// Method carries the padding; `total` must be at least 53.
pub(crate) fn components_with_total(total: usize) -> Vec<(&'static str, Vec<u8>)> {
    let mut header = vec![
        0x01, 0x00, 0x11, 0xDE, 0xCA, 0xFF, 0xED, 0x01, 0x02, 0x04, 0x00, 0x01, 0x07,
    ];
    header.extend_from_slice(&PACKAGE_AID);

    let mut applet = vec![0x03, 0x00, 0x0C, 0x01, 0x08];
    applet.extend_from_slice(&APPLET_AID);
    applet.extend_from_slice(&[0x00, 0x20]);

    let fixed = header.len() + applet.len() + 6 * 3;
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

/// Zip `components` the way a converter lays them out
pub(crate) fn cap_archive(components: &[(&str, Vec<u8>)]) -> Vec<u8> {
    use std::io::{Cursor, Write};
    use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

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

/// Authenticated instance whose transport then replays `responses`
///
/// The handshake uses the known-answer session for the default key.
pub(crate) fn authenticated(responses: &[&[u8]]) -> crate::GlobalPlatform<ScriptedTransport> {
    use crate::{GlobalPlatform, GpConfig, HostChallenge, Keys};

    let mut script: Vec<&[u8]> =
        vec![&[0x90, 0x00][..], &INIT_UPDATE_RESPONSE[..], &[0x90, 0x00][..]];
    script.extend_from_slice(responses);

    let config = GpConfig::default().with_host_challenge(HostChallenge::Fixed(HOST_CHALLENGE));
    let transport = ScriptedTransport::new(&script);
    let mut gp = GlobalPlatform::with_config(transport, Keys::default(), config);
    gp.authenticate().unwrap();
    gp.transport_mut().sent.clear();
    gp
}

const HOST_CHALLENGE: [u8; 8] = [0xf0, 0x46, 0x7f, 0x90, 0x8e, 0x5c, 0xa2, 0x3f];

const INIT_UPDATE_RESPONSE: [u8; 30] = [
    0x00, 0x00, 0x02, 0x65, 0x01, 0x83, 0x03, 0x95, 0x36, 0x62, 0x20, 0x02, 0x00, 0x0d, 0xe9,
    0xc6, 0x2b, 0xa1, 0xc4, 0xc8, 0xe5, 0x5f, 0xcb, 0x91, 0xb6, 0x65, 0x4c, 0xe4, 0x90, 0x00,
];
