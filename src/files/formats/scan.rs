//! Embedded-metadata scan fallback
//!
//! Sigma FOVb files (and anything else no handler recognizes) get a
//! best-effort sweep: find an `Exif\0\0` marker immediately followed by a
//! TIFF byte-order mark and parse from there.

use crate::core::error::{ExifError, ExifResult};
use crate::core::metadata::{FileType, FileVariant};
use crate::core::parser;
use crate::files::handler::{ContainerHandler, ReadContext};

const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Scan for an `Exif\0\0` header followed by "II" or "MM". Returns the
/// offset of the TIFF stream (just past the header).
pub(crate) fn find_embedded_tiff(buf: &[u8]) -> Option<usize> {
    let mut from = 0;
    while from + EXIF_HEADER.len() + 2 <= buf.len() {
        let window = &buf[from..];
        let hit = window
            .windows(EXIF_HEADER.len())
            .position(|w| w == EXIF_HEADER)?;
        let tiff_start = from + hit + EXIF_HEADER.len();
        match buf.get(tiff_start..tiff_start + 2) {
            Some(b"II") | Some(b"MM") => return Some(tiff_start),
            _ => from = from + hit + 1,
        }
    }
    None
}

/// Parse whatever TIFF stream the scan turns up.
pub(crate) fn read_scanned(buf: &[u8], ctx: &mut ReadContext<'_>) -> ExifResult<()> {
    let Some(at) = find_embedded_tiff(buf) else {
        return Err(ExifError::UnknownFileType(
            "no embedded Exif metadata found".to_string(),
        ));
    };
    parser::read_tiff(&buf[at..], ctx.data, ctx.warnings, ctx.options.is_strict())
}

/// Sigma FOVb raw files: recognized by magic, located by scanning.
#[derive(Debug, Clone, Copy)]
pub struct FovbHandler;

impl ContainerHandler for FovbHandler {
    fn can_handle(&self, buf: &[u8]) -> bool {
        buf.len() >= 4 && &buf[..4] == b"FOVb"
    }

    fn read_metadata(&self, buf: &[u8], ctx: &mut ReadContext<'_>) -> ExifResult<()> {
        ctx.data.file_type = FileType::Fovb;
        ctx.data.variant = FileVariant::Standard;
        read_scanned(buf, ctx)
    }

    fn format_name(&self) -> &'static str {
        "FOVb"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["x3f"]
    }
}
