//! Minolta MRW container handler
//!
//! MRW files open with `\0MRM` followed by a big-endian header length, then a
//! sequence of tagged blocks `(u32 tag, u32 size, bytes)`. The `TTW` block
//! holds a TIFF stream; a successful parse of it is terminal success.

use crate::core::cursor::{ByteCursor, Endian};
use crate::core::error::{ExifError, ExifResult};
use crate::core::metadata::{FileType, FileVariant};
use crate::core::parser;
use crate::files::handler::{ContainerHandler, ReadContext};
use log::trace;

const MRW_MAGIC: &[u8] = &[0x00, b'M', b'R', b'M'];

#[derive(Debug, Clone, Copy)]
pub struct MrwHandler;

impl ContainerHandler for MrwHandler {
    fn can_handle(&self, buf: &[u8]) -> bool {
        buf.len() >= 8 && &buf[..4] == MRW_MAGIC
    }

    fn read_metadata(&self, buf: &[u8], ctx: &mut ReadContext<'_>) -> ExifResult<()> {
        ctx.data.file_type = FileType::Mrw;
        ctx.data.variant = FileVariant::Standard;

        let mut cursor = ByteCursor::new(buf, Endian::Big);
        cursor.seek(4)?;
        let header_len = cursor.read_u32()? as usize;
        let header_end = 8usize.saturating_add(header_len).min(buf.len());

        let mut pos = 8;
        while pos + 8 <= header_end {
            cursor.seek(pos)?;
            let block_tag = cursor.read_raw4()?;
            let block_size = cursor.read_u32()? as usize;
            trace!(
                "MRW block {:?} of {} bytes",
                String::from_utf8_lossy(&block_tag[1..]),
                block_size
            );
            if &block_tag[1..4] == b"TTW" {
                let tiff = cursor.view(pos + 8, block_size)?;
                return parser::read_tiff(tiff, ctx.data, ctx.warnings, ctx.options.is_strict());
            }
            pos += 8 + block_size;
        }

        Err(ExifError::CorruptData(
            "MRW header holds no TTW metadata block".to_string(),
        ))
    }

    fn format_name(&self) -> &'static str {
        "MRW"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["mrw"]
    }
}
