//! Manufacturer note decoders
//!
//! Maker notes are opaque blobs addressed by a dedicated tag; each
//! manufacturer embeds its own directory format. Dispatch is by magic
//! prefix. Unknown manufacturers are reported, not guessed at.

pub mod nikon;

use crate::core::error::{ExifError, ExifResult, ParseWarning};
use crate::core::metadata::ExifData;
use log::debug;

/// Decode a maker note found at `offset`/`length` within the enclosing TIFF
/// stream, dispatching on its magic prefix.
pub(crate) fn parse(
    stream: &[u8],
    offset: u32,
    length: u32,
    data: &mut ExifData,
    warnings: &mut Vec<ParseWarning>,
    strict: bool,
) -> ExifResult<()> {
    let start = offset as usize;
    let end = start
        .checked_add(length as usize)
        .filter(|&end| end <= stream.len())
        .ok_or_else(|| ExifError::CorruptData("maker note out of bounds".to_string()))?;
    let note = &stream[start..end];

    if note.starts_with(nikon::MAGIC) {
        debug!("decoding Nikon maker note ({} bytes)", note.len());
        return nikon::parse(note, data, warnings, strict);
    }

    Err(ExifError::UnknownFileType(
        "maker note of unknown type".to_string(),
    ))
}
