// Tag removal: payload bound computation and the copy loop.

use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

use log::{debug, warn};

use crate::id3::{v1, Id3v2Header};
use crate::Error;

/// Major versions the stripper knows how to skip. The parser accepts any
/// well-formed header so probing still reports other versions.
pub const SUPPORTED_VERSIONS: &[u8] = &[3];

const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// How the stripper treats ID3v2 format flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagPolicy {
    /// Refuse headers with unsynchronisation, extended header or
    /// experimental flags set.
    Strict,
    /// Skip the declared tag size regardless of flags, warning when any
    /// is set.
    #[default]
    Permissive,
}

/// Copy the payload region of `input` to `output`, dropping an ID3v2 tag at
/// the front and an ID3v1 tag at the back. Returns the bytes written.
///
/// Fails with [`Error::NoMetadataFound`] when the input carries neither tag;
/// the output stream is untouched in that case.
pub fn strip_with_policy<R: Read + Seek, W: Write>(
    input: &mut R,
    output: &mut W,
    policy: FlagPolicy,
) -> Result<u64, Error> {
    let header = Id3v2Header::read(input)?;

    let start = match &header {
        Some(header) => {
            if !SUPPORTED_VERSIONS.contains(&header.major_version) {
                return Err(Error::UnsupportedVersion {
                    major: header.major_version,
                    revision: header.revision,
                });
            }
            if header.has_format_flags() {
                match policy {
                    FlagPolicy::Strict => {
                        return Err(Error::UnsupportedFlags {
                            unsynchronisation: header.unsynchronisation,
                            extended_header: header.extended_header,
                            experimental: header.experimental,
                        });
                    }
                    FlagPolicy::Permissive => {
                        warn!(
                            "ID3v2 format flags set (unsynchronisation={}, \
                             extended_header={}, experimental={}); \
                             skipping by declared size anyway",
                            header.unsynchronisation,
                            header.extended_header,
                            header.experimental
                        );
                    }
                }
            }
            header.total_size()
        }
        None => 0,
    };

    let v1_offset = v1::locate(input)?;
    if header.is_none() && v1_offset.is_none() {
        return Err(Error::NoMetadataFound);
    }

    let end = match v1_offset {
        Some(offset) => offset,
        None => input.seek(SeekFrom::End(0))?,
    };
    if start > end {
        return Err(Error::CorruptHeader { start, end });
    }

    debug!("copying payload bytes {}..{}", start, end);
    input.seek(SeekFrom::Start(start))?;
    copy_exact(input, output, end - start)
}

/// Copy exactly `remaining` bytes, alternating one bounded read with one
/// write so memory stays at a single buffer.
fn copy_exact<R: Read, W: Write>(
    input: &mut R,
    output: &mut W,
    mut remaining: u64,
) -> Result<u64, Error> {
    let mut buffer = [0u8; COPY_BUFFER_SIZE];
    let mut written = 0u64;

    while remaining > 0 {
        let want = remaining.min(buffer.len() as u64) as usize;
        let got = input.read(&mut buffer[..want])?;
        if got == 0 {
            return Err(Error::IoError(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("payload ended {} bytes early", remaining),
            )));
        }
        output.write_all(&buffer[..got])?;
        written += got as u64;
        remaining -= got as u64;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    // 10-byte ID3v2.3.0 header with the given flags and synchsafe size.
    fn v2_header(flags: u8, tag_size: u32) -> Vec<u8> {
        let mut bytes = b"ID3\x03\x00".to_vec();
        bytes.push(flags);
        bytes.extend_from_slice(&[
            ((tag_size >> 21) & 0x7F) as u8,
            ((tag_size >> 14) & 0x7F) as u8,
            ((tag_size >> 7) & 0x7F) as u8,
            (tag_size & 0x7F) as u8,
        ]);
        bytes
    }

    fn v1_block() -> Vec<u8> {
        let mut bytes = b"TAG".to_vec();
        bytes.extend_from_slice(&[0u8; 125]);
        bytes
    }

    fn strip_bytes(input: Vec<u8>) -> Result<(u64, Vec<u8>), Error> {
        let mut reader = Cursor::new(input);
        let mut output = Vec::new();
        let written = strip_with_policy(&mut reader, &mut output, FlagPolicy::default())?;
        Ok((written, output))
    }

    #[test]
    fn test_v2_only() {
        let payload = vec![0x55; 100];
        let mut input = v2_header(0x00, 20);
        input.extend_from_slice(&[0u8; 20]);
        input.extend_from_slice(&payload);

        let (written, output) = strip_bytes(input).unwrap();
        assert_eq!(written, 100);
        assert_eq!(output, payload);
    }

    #[test]
    fn test_v1_only() {
        let payload = vec![0x66; 500];
        let mut input = payload.clone();
        input.extend_from_slice(&v1_block());

        let (written, output) = strip_bytes(input).unwrap();
        assert_eq!(written, 500);
        assert_eq!(output, payload);
    }

    #[test]
    fn test_both_tags() {
        let payload = vec![0x77; 100];
        let mut input = v2_header(0x00, 20);
        input.extend_from_slice(&[0u8; 20]);
        input.extend_from_slice(&payload);
        input.extend_from_slice(&v1_block());

        let (written, output) = strip_bytes(input).unwrap();
        assert_eq!(written, 100);
        assert_eq!(output, payload);
    }

    #[test]
    fn test_empty_payload() {
        let mut input = v2_header(0x00, 20);
        input.extend_from_slice(&[0u8; 20]);
        input.extend_from_slice(&v1_block());

        let (written, output) = strip_bytes(input).unwrap();
        assert_eq!(written, 0);
        assert!(output.is_empty());
    }

    #[test]
    fn test_untagged_input() {
        let result = strip_bytes(vec![0x88; 300]);
        assert!(matches!(result, Err(Error::NoMetadataFound)));
    }

    #[test]
    fn test_idempotence() {
        let mut input = v2_header(0x00, 20);
        input.extend_from_slice(&[0u8; 20]);
        input.extend_from_slice(&[0x99; 400]);
        input.extend_from_slice(&v1_block());

        let (_, first_pass) = strip_bytes(input).unwrap();
        let result = strip_bytes(first_pass);
        assert!(matches!(result, Err(Error::NoMetadataFound)));
    }

    #[test]
    fn test_tag_size_past_eof() {
        // Declares a 1000-byte tag but the file ends long before that.
        let mut input = v2_header(0x00, 1000);
        input.extend_from_slice(&[0u8; 50]);

        let result = strip_bytes(input);
        assert!(matches!(
            result,
            Err(Error::CorruptHeader {
                start: 1010,
                end: 60
            })
        ));
    }

    #[test]
    fn test_tag_overlapping_v1_region() {
        // Tag claims bytes that belong to the trailing ID3v1 block.
        let mut input = v2_header(0x00, 40);
        input.extend_from_slice(&[0u8; 10]);
        input.extend_from_slice(&v1_block());

        let result = strip_bytes(input);
        assert!(matches!(result, Err(Error::CorruptHeader { .. })));
    }

    #[test]
    fn test_unsupported_version() {
        let mut input = b"ID3\x04\x00\x00\x00\x00\x00\x14".to_vec();
        input.extend_from_slice(&[0u8; 120]);

        let result = strip_bytes(input);
        assert!(matches!(
            result,
            Err(Error::UnsupportedVersion {
                major: 4,
                revision: 0
            })
        ));
    }

    #[test]
    fn test_strict_policy_rejects_format_flags() {
        let mut input = v2_header(0x40, 20);
        input.extend_from_slice(&[0u8; 20]);
        input.extend_from_slice(&[0xAB; 30]);

        let mut reader = Cursor::new(input);
        let mut output = Vec::new();
        let result = strip_with_policy(&mut reader, &mut output, FlagPolicy::Strict);
        assert!(matches!(
            result,
            Err(Error::UnsupportedFlags {
                extended_header: true,
                ..
            })
        ));
        assert!(output.is_empty());
    }

    #[test]
    fn test_permissive_policy_strips_despite_flags() {
        let payload = vec![0xCD; 30];
        let mut input = v2_header(0xE0, 20);
        input.extend_from_slice(&[0u8; 20]);
        input.extend_from_slice(&payload);

        let (written, output) = strip_bytes(input).unwrap();
        assert_eq!(written, 30);
        assert_eq!(output, payload);
    }

    #[test]
    fn test_payload_larger_than_copy_buffer() {
        let payload: Vec<u8> = (0..COPY_BUFFER_SIZE * 3 + 17).map(|i| i as u8).collect();
        let mut input = v2_header(0x00, 4);
        input.extend_from_slice(&[0u8; 4]);
        input.extend_from_slice(&payload);
        input.extend_from_slice(&v1_block());

        let (written, output) = strip_bytes(input).unwrap();
        assert_eq!(written, payload.len() as u64);
        assert_eq!(output, payload);
    }
}
