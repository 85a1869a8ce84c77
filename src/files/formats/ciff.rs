//! Canon CIFF (CRW) detection
//!
//! CIFF files are recognized by the `HEAPCCDR` signature at byte 6. The CIFF
//! heap is not a TIFF stream and no decoder is implemented; detection exists
//! so the error names the format instead of "unknown file type".

use crate::core::error::{ExifError, ExifResult};
use crate::core::metadata::{FileType, FileVariant};
use crate::files::handler::{ContainerHandler, ReadContext};

const CIFF_MAGIC: &[u8] = b"HEAPCCDR";
const CIFF_MAGIC_OFFSET: usize = 6;

#[derive(Debug, Clone, Copy)]
pub struct CiffHandler;

impl ContainerHandler for CiffHandler {
    fn can_handle(&self, buf: &[u8]) -> bool {
        buf.len() >= CIFF_MAGIC_OFFSET + CIFF_MAGIC.len()
            && &buf[CIFF_MAGIC_OFFSET..CIFF_MAGIC_OFFSET + CIFF_MAGIC.len()] == CIFF_MAGIC
    }

    fn read_metadata(&self, _buf: &[u8], ctx: &mut ReadContext<'_>) -> ExifResult<()> {
        ctx.data.file_type = FileType::Ciff;
        ctx.data.variant = FileVariant::Standard;
        Err(ExifError::UnknownFileType(
            "CIFF parser not implemented".to_string(),
        ))
    }

    fn format_name(&self) -> &'static str {
        "CIFF"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["crw"]
    }
}
