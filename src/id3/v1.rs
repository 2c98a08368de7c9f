// ID3v1 trailing tag detection
//
// Removal only needs presence and offset, so none of the fixed-width text
// fields are parsed.

use std::io::{Read, Seek, SeekFrom};

pub const TAG_SIZE: u64 = 128;
const TAG_ID: [u8; 3] = *b"TAG";

/// Locate a trailing ID3v1 tag, returning its byte offset when present.
///
/// Files shorter than the 128-byte tag report `None`. The read position is
/// restored before returning.
pub fn locate<R: Read + Seek>(reader: &mut R) -> std::io::Result<Option<u64>> {
    let pos = reader.stream_position()?;
    let len = reader.seek(SeekFrom::End(0))?;

    let found = if len < TAG_SIZE {
        None
    } else {
        let offset = reader.seek(SeekFrom::End(-(TAG_SIZE as i64)))?;
        let mut identifier = [0u8; 3];
        reader.read_exact(&mut identifier)?;
        if identifier == TAG_ID {
            Some(offset)
        } else {
            None
        }
    };

    reader.seek(SeekFrom::Start(pos))?;
    Ok(found)
}
