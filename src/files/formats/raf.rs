//! Fujifilm RAF container handler
//!
//! RAF files carry a big-endian header; the offset and length of the
//! embedded JPEG (whose EXIF we want) live at 0x54. The pointed-to region is
//! parsed as a TIFF stream.

use crate::core::cursor::{ByteCursor, Endian};
use crate::core::error::{ExifError, ExifResult};
use crate::core::metadata::{FileType, FileVariant};
use crate::core::parser;
use crate::files::handler::{ContainerHandler, ReadContext};
use crate::files::formats::scan;

const RAF_MAGIC: &[u8] = b"FUJIFILMCCD-RAW";
const POINTER_OFFSET: usize = 0x54;

#[derive(Debug, Clone, Copy)]
pub struct RafHandler;

impl ContainerHandler for RafHandler {
    fn can_handle(&self, buf: &[u8]) -> bool {
        buf.len() >= RAF_MAGIC.len() && &buf[..RAF_MAGIC.len()] == RAF_MAGIC
    }

    fn read_metadata(&self, buf: &[u8], ctx: &mut ReadContext<'_>) -> ExifResult<()> {
        ctx.data.file_type = FileType::Raf;
        ctx.data.variant = FileVariant::Standard;

        let mut cursor = ByteCursor::new(buf, Endian::Big);
        cursor.seek(POINTER_OFFSET)?;
        let offset = cursor.read_u32()? as usize;
        let length = cursor.read_u32()? as usize;
        let region = cursor.view(offset, length)?;

        // The pointed-to region is the embedded JPEG; its EXIF sits behind
        // an Exif\0\0 marker. A region that already starts as TIFF parses
        // directly.
        let tiff: &[u8] = if region.starts_with(b"II") || region.starts_with(b"MM") {
            region
        } else {
            match scan::find_embedded_tiff(region) {
                Some(at) => &region[at..],
                None => {
                    return Err(ExifError::CorruptData(
                        "RAF metadata region holds no TIFF stream".to_string(),
                    ))
                }
            }
        };
        parser::read_tiff(tiff, ctx.data, ctx.warnings, ctx.options.is_strict())
    }

    fn format_name(&self) -> &'static str {
        "RAF"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["raf"]
    }
}
