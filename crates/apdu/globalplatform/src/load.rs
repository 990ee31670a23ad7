//! CAP file reading
//!
//! A CAP file is a zip archive holding one file per package component. The
//! components needed on card are concatenated in a fixed order and wrapped in
//! a `C4` load file data block, which is then sent in LOAD blocks of at most
//! 255 bytes.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;
use zip::ZipArchive;

use crate::{PackageError, constants::tags};

/// Maximum data length of one LOAD command
pub const BLOCK_SIZE: usize = 255;

/// LOAD block numbers are a single byte
pub const MAX_BLOCKS: usize = 256;

/// Components sent to the card, in load order
pub const COMPONENTS: [&str; 9] = [
    "Header",
    "Directory",
    "Import",
    "Applet",
    "Class",
    "Method",
    "StaticField",
    "ConstantPool",
    "RefLocation",
];

/// Offset of the package AID length in the Header component
const HEADER_AID_LENGTH_OFFSET: usize = 12;
/// Offset of the applet count in the Applet component
const APPLET_COUNT_OFFSET: usize = 3;
/// Offset of the first applet AID length in the Applet component
const APPLET_AID_LENGTH_OFFSET: usize = 4;

/// Encode the length of the load file data block
///
/// The long forms switch one value early: `0xFF` already takes the `82` form
/// and `0xFFFF` the `83` form.
pub fn encode_length(length: usize) -> Result<Vec<u8>, PackageError> {
    let encoded = if length < 0x80 {
        vec![length as u8]
    } else if length < 0xFF {
        vec![0x81, length as u8]
    } else if length < 0xFFFF {
        vec![0x82, (length >> 8) as u8, length as u8]
    } else if length < 0xFF_FFFF {
        vec![0x83, (length >> 16) as u8, (length >> 8) as u8, length as u8]
    } else {
        return Err(PackageError::TooLarge(length));
    };

    Ok(encoded)
}

/// Read a length-prefixed AID starting at `offset`
fn aid_at(data: &[u8], offset: usize, component: &'static str) -> Result<Bytes, PackageError> {
    let length = *data.get(offset).ok_or(PackageError::Malformed(component))? as usize;
    data.get(offset + 1..offset + 1 + length)
        .filter(|aid| !aid.is_empty())
        .map(Bytes::copy_from_slice)
        .ok_or(PackageError::Malformed(component))
}

/// Whether an archive entry is the file for `component`, in any directory
fn is_component_entry(entry: &str, component: &str) -> bool {
    entry
        .rsplit('/')
        .next()
        .and_then(|file| file.strip_suffix(".cap"))
        == Some(component)
}

/// One chunk of the load file data block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadBlock<'a> {
    /// Block number, sent as P2
    pub number: u8,
    /// Whether this is the final block
    pub last: bool,
    /// Block contents
    pub data: &'a [u8],
}

/// A single-applet package ready to be loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapFile {
    package_aid: Bytes,
    applet_aid: Bytes,
    component_sizes: Vec<(&'static str, usize)>,
    load_file: Bytes,
}

impl CapFile {
    /// Read a CAP file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PackageError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read a CAP archive from any seekable source
    ///
    /// All components are located before any of them is read, so a missing
    /// component is reported without decompressing anything.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, PackageError> {
        let mut archive = ZipArchive::new(reader)?;
        let entries: Vec<String> = archive.file_names().map(str::to_owned).collect();

        let mut located = Vec::with_capacity(COMPONENTS.len());
        for component in COMPONENTS {
            let entry = entries
                .iter()
                .find(|entry| is_component_entry(entry, component))
                .ok_or(PackageError::MissingComponent(component))?;
            let size = archive.by_name(entry)?.size();
            let size = usize::try_from(size).unwrap_or(usize::MAX);
            located.push((component, entry.as_str(), size));
        }

        let total = located
            .iter()
            .fold(0usize, |sum, (_, _, size)| sum.saturating_add(*size));
        let prefix = encode_length(total)?;
        let length = 1 + prefix.len() + total;
        let blocks = length.div_ceil(BLOCK_SIZE);
        if blocks > MAX_BLOCKS {
            return Err(PackageError::TooManyBlocks(blocks));
        }

        let mut load_file = BytesMut::with_capacity(length);
        load_file.put_u8(tags::LOAD_FILE_DATA_BLOCK);
        load_file.put_slice(&prefix);

        let mut package_aid = Bytes::new();
        let mut applet_aid = Bytes::new();
        let mut component_sizes = Vec::with_capacity(COMPONENTS.len());

        for (component, entry, size) in located {
            let mut data = Vec::with_capacity(size);
            archive.by_name(entry)?.read_to_end(&mut data)?;
            if data.len() != size {
                return Err(PackageError::Malformed(component));
            }

            match component {
                "Header" => {
                    package_aid = aid_at(&data, HEADER_AID_LENGTH_OFFSET, component)?;
                }
                "Applet" => {
                    let count = *data
                        .get(APPLET_COUNT_OFFSET)
                        .ok_or(PackageError::Malformed(component))?;
                    if count != 1 {
                        return Err(PackageError::AppletCount(count));
                    }
                    applet_aid = aid_at(&data, APPLET_AID_LENGTH_OFFSET, component)?;
                }
                _ => {}
            }

            load_file.put_slice(&data);
            component_sizes.push((component, size));
        }

        debug!(
            package = %hex::encode_upper(&package_aid),
            applet = %hex::encode_upper(&applet_aid),
            length = load_file.len(),
            blocks,
            "CAP file read"
        );

        Ok(Self {
            package_aid,
            applet_aid,
            component_sizes,
            load_file: load_file.freeze(),
        })
    }

    /// Package AID from the Header component
    pub fn package_aid(&self) -> &[u8] {
        &self.package_aid
    }

    /// AID of the package's only applet, also used as instance AID
    pub fn applet_aid(&self) -> &[u8] {
        &self.applet_aid
    }

    /// Complete load file data block, tag and length included
    pub fn load_file(&self) -> &[u8] {
        &self.load_file
    }

    /// Number of LOAD commands needed
    pub fn block_count(&self) -> usize {
        self.load_file.len().div_ceil(BLOCK_SIZE)
    }

    /// LOAD blocks in transmission order
    pub fn blocks(&self) -> impl Iterator<Item = LoadBlock<'_>> {
        let count = self.block_count();
        self.load_file
            .chunks(BLOCK_SIZE)
            .enumerate()
            .map(move |(index, data)| LoadBlock {
                number: index as u8,
                last: index + 1 == count,
                data,
            })
    }

    /// Summary of the package without touching a card
    pub fn info(&self) -> CapFileInfo {
        CapFileInfo {
            package_aid: self.package_aid.to_vec(),
            applet_aid: self.applet_aid.to_vec(),
            components: self.component_sizes.clone(),
            load_file_length: self.load_file.len(),
            block_count: self.block_count(),
        }
    }
}

/// Information about a CAP file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapFileInfo {
    /// Package AID
    pub package_aid: Vec<u8>,
    /// Applet AID
    pub applet_aid: Vec<u8>,
    /// Component names and sizes, in load order
    pub components: Vec<(&'static str, usize)>,
    /// Length of the load file data block
    pub load_file_length: usize,
    /// Number of LOAD blocks
    pub block_count: usize,
}

impl fmt::Display for CapFileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Package AID: {}", hex::encode_upper(&self.package_aid))?;
        writeln!(f, "Applet AID:  {}", hex::encode_upper(&self.applet_aid))?;
        writeln!(f, "Components:")?;
        for (name, size) in &self.components {
            writeln!(f, "  {name:<14}{size:>6} bytes")?;
        }
        write!(
            f,
            "Load file:   {} bytes in {} LOAD blocks",
            self.load_file_length, self.block_count
        )
    }
}
