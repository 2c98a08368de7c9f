//! Detag - strip ID3 metadata from audio files.
//!
//! The library works on caller-owned streams: probe a file for an ID3v2
//! header with [`probe`], then remove every tag region with [`strip`]. Only
//! removal is supported; nothing here writes or edits tag data.

use std::io::{Read, Seek, Write};

mod id3;
mod strip;

pub use crate::id3::Id3v2Header;
pub use crate::strip::{FlagPolicy, SUPPORTED_VERSIONS};

use std::fmt;
use std::io;

/// Errors produced while probing or stripping a file.
///
/// A missing ID3v2 header is not an error: [`probe`] reports it as
/// `Ok(None)` so callers can fall back to ID3v1-only handling.
#[derive(Debug)]
pub enum Error {
    /// The version or revision byte is the reserved 255 sentinel.
    InvalidVersion { major: u8, revision: u8 },
    /// A synchsafe size byte has its high bit set.
    InvalidSize { byte: u8 },
    /// The header is well formed but its major version cannot be stripped.
    UnsupportedVersion { major: u8, revision: u8 },
    /// Strict policy refused a header with format flags set.
    UnsupportedFlags {
        unsynchronisation: bool,
        extended_header: bool,
        experimental: bool,
    },
    /// The declared tag size puts the payload start past its end.
    CorruptHeader { start: u64, end: u64 },
    /// Neither an ID3v2 header nor a trailing ID3v1 tag was found.
    NoMetadataFound,
    IoError(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidVersion { major, revision } => {
                write!(f, "invalid ID3v2 version 2.{}.{}", major, revision)
            }
            Error::InvalidSize { byte } => {
                write!(f, "invalid ID3v2 size byte 0x{:02X} (high bit set)", byte)
            }
            Error::UnsupportedVersion { major, revision } => {
                let supported = SUPPORTED_VERSIONS
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join("/");
                write!(
                    f,
                    "only ID3v2.[{}].0 tags can be stripped (got ID3v2.{}.{})",
                    supported, major, revision
                )
            }
            Error::UnsupportedFlags {
                unsynchronisation,
                extended_header,
                experimental,
            } => {
                let mut set = Vec::new();
                if *unsynchronisation {
                    set.push("unsynchronisation");
                }
                if *extended_header {
                    set.push("extended header");
                }
                if *experimental {
                    set.push("experimental");
                }
                write!(f, "ID3v2 format flags set ({})", set.join(", "))
            }
            Error::CorruptHeader { start, end } => {
                write!(
                    f,
                    "corrupt header: payload start {} is past end {}",
                    start, end
                )
            }
            Error::NoMetadataFound => write!(f, "no ID3 metadata found"),
            Error::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

/// Probe for an ID3v2 header at the stream's current position.
///
/// Returns `Ok(None)` when the identifier does not match. The read position
/// is restored before returning, so a probe never consumes the stream.
pub fn probe<R: Read + Seek>(input: &mut R) -> Result<Option<Id3v2Header>, Error> {
    Id3v2Header::read(input)
}

/// Report the offset of a trailing ID3v1 tag, if one is present.
pub fn id3v1_offset<R: Read + Seek>(input: &mut R) -> io::Result<Option<u64>> {
    id3::v1::locate(input)
}

/// Strip all ID3 metadata from `input` into `output` under the default
/// (permissive) flag policy. Returns the number of payload bytes written.
pub fn strip<R: Read + Seek, W: Write>(input: &mut R, output: &mut W) -> Result<u64, Error> {
    strip::strip_with_policy(input, output, FlagPolicy::default())
}

/// Strip all ID3 metadata from `input` into `output` under an explicit
/// flag policy.
pub fn strip_with_policy<R: Read + Seek, W: Write>(
    input: &mut R,
    output: &mut W,
    policy: FlagPolicy,
) -> Result<u64, Error> {
    strip::strip_with_policy(input, output, policy)
}
