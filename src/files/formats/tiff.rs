//! TIFF container handler
//!
//! Covers standard TIFF plus the TIFF-based raw variants that change the
//! magic word after the byte-order mark: Olympus ORF and Panasonic RW2. The
//! whole file is the metadata stream; parsing starts at the root directory
//! offset in the header.

use crate::core::cursor::{ByteCursor, Endian};
use crate::core::error::ExifResult;
use crate::core::metadata::{FileType, FileVariant};
use crate::core::parser;
use crate::files::handler::{ContainerHandler, ReadContext};

/// TIFF magic word (the answer), ORF ("RO"/"RS") and RW2 magic words.
const MAGIC_TIFF: u16 = 42;
const MAGIC_ORF_RO: u16 = 0x4F52;
const MAGIC_ORF_RS: u16 = 0x5352;
const MAGIC_RW2: u16 = 0x55;

#[derive(Debug, Clone, Copy)]
pub struct TiffHandler;

impl TiffHandler {
    fn sniff(buf: &[u8]) -> Option<FileVariant> {
        let order = match buf.get(0..2)? {
            b"II" => Endian::Little,
            b"MM" => Endian::Big,
            _ => return None,
        };
        let mut cursor = ByteCursor::new(buf, order);
        cursor.seek(2).ok()?;
        match cursor.read_u16().ok()? {
            MAGIC_TIFF => Some(FileVariant::Standard),
            MAGIC_ORF_RO | MAGIC_ORF_RS => Some(FileVariant::Orf),
            MAGIC_RW2 => Some(FileVariant::Rw2),
            _ => None,
        }
    }
}

impl ContainerHandler for TiffHandler {
    fn can_handle(&self, buf: &[u8]) -> bool {
        Self::sniff(buf).is_some()
    }

    fn read_metadata(&self, buf: &[u8], ctx: &mut ReadContext<'_>) -> ExifResult<()> {
        ctx.data.file_type = FileType::Tiff;
        ctx.data.variant = Self::sniff(buf).unwrap_or(FileVariant::Standard);
        parser::read_tiff(buf, ctx.data, ctx.warnings, ctx.options.is_strict())
    }

    fn format_name(&self) -> &'static str {
        "TIFF"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["tif", "tiff", "dng", "nef", "orf", "rw2"]
    }
}
