// ID3v2 header parsing
//
// Covers the fixed 10-byte header of an ID3v2 tag as laid out in the
// informal standard at https://id3.org/id3v2.3.0. Frame contents are never
// parsed; stripping only needs the declared tag size.

use std::io::{Read, Seek, SeekFrom};

use log::warn;
use serde::Serialize;

use crate::Error;

/// Parsed ID3v2 header (the fixed 10-byte prefix).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Id3v2Header {
    pub major_version: u8,
    pub revision: u8,
    /// Flag bit 7.
    pub unsynchronisation: bool,
    /// Flag bit 6.
    pub extended_header: bool,
    /// Flag bit 5.
    pub experimental: bool,
    /// Flag bits 4..0, reserved and expected to be zero.
    pub other_flags: u8,
    /// Total tag size after the header, decoded from the synchsafe field.
    pub tag_size: u32,
}

impl Id3v2Header {
    pub const SIZE: u64 = 10;
    const ID: [u8; 3] = *b"ID3";

    /// Probe for an ID3v2 header at the stream's current position.
    ///
    /// Returns `Ok(None)` when the identifier does not match. The read
    /// position is restored on every exit path, including parse failures,
    /// so callers can probe and then branch without reseeking.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Option<Self>, Error> {
        let pos = reader.stream_position()?;
        let result = Self::read_inner(reader);
        reader.seek(SeekFrom::Start(pos))?;
        result
    }

    fn read_inner<R: Read>(reader: &mut R) -> Result<Option<Self>, Error> {
        let mut identifier = [0u8; 3];
        reader.read_exact(&mut identifier)?;
        if identifier != Self::ID {
            return Ok(None);
        }

        let mut rest = [0u8; 7];
        reader.read_exact(&mut rest)?;

        let (major_version, revision) = (rest[0], rest[1]);
        if major_version == 0xFF || revision == 0xFF {
            return Err(Error::InvalidVersion {
                major: major_version,
                revision,
            });
        }

        let flags = rest[2];
        let other_flags = flags & 0x1F;
        if other_flags != 0 {
            let set: Vec<u8> = (0..5u8).rev().filter(|&i| flags & (1u8 << i) != 0).collect();
            warn!("reserved ID3v2 flag bits set: {:?}", set);
        }

        let tag_size = parse_synchsafe(&rest[3..7])?;

        Ok(Some(Id3v2Header {
            major_version,
            revision,
            unsynchronisation: flags & 0x80 != 0,
            extended_header: flags & 0x40 != 0,
            experimental: flags & 0x20 != 0,
            other_flags,
            tag_size,
        }))
    }

    /// True when any of the three defined format flags is set.
    pub fn has_format_flags(&self) -> bool {
        self.unsynchronisation || self.extended_header || self.experimental
    }

    /// Size of the whole tag region including the header itself.
    pub fn total_size(&self) -> u64 {
        Self::SIZE + self.tag_size as u64
    }
}

/// Decode a 4-byte synchsafe integer (7 bits per byte, most significant
/// byte first). A byte with its high bit set is a corrupt size field.
fn parse_synchsafe(bytes: &[u8]) -> Result<u32, Error> {
    let mut size = 0u32;
    for &byte in bytes {
        if byte & 0x80 != 0 {
            return Err(Error::InvalidSize { byte });
        }
        size = (size << 7) | byte as u32;
    }
    Ok(size)
}
