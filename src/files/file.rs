//! High-level read API
//!
//! Entry points for parsing metadata out of a byte buffer or a file path.
//! Files are memory-mapped; buffers are parsed in place. The detected
//! container handler does the format-specific work, with a scan fallback for
//! unrecognized containers.

use crate::core::error::{ExifError, ExifResult, ParseWarning};
use crate::core::metadata::{ExifData, FileType, FileVariant};
use crate::files::formats::scan;
use crate::files::handler::{ContainerHandler, ReadContext, ReadOptions};
use crate::files::registry::HandlerRegistry;
use log::debug;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Minimum plausible size of a camera file on disk.
const MIN_FILE_LEN: usize = 100;
/// Minimum buffer that can hold a TIFF header at all.
const MIN_BUFFER_LEN: usize = 8;

/// A successfully parsed record plus the warnings accumulated along the way.
#[derive(Debug)]
pub struct ParsedExif {
    pub data: Box<ExifData>,
    pub warnings: Vec<ParseWarning>,
}

impl ParsedExif {
    pub fn file_type(&self) -> FileType {
        self.data.file_type
    }

    pub fn variant(&self) -> FileVariant {
        self.data.variant
    }
}

/// Parse metadata from an in-memory buffer with default (lenient) options.
pub fn read_bytes(buf: &[u8]) -> ExifResult<ParsedExif> {
    read_bytes_with(buf, ReadOptions::default())
}

/// Parse metadata from an in-memory buffer.
pub fn read_bytes_with(buf: &[u8], options: ReadOptions) -> ExifResult<ParsedExif> {
    if buf.len() < MIN_BUFFER_LEN {
        return Err(ExifError::CorruptData("buffer too small".to_string()));
    }

    let mut result = ParsedExif {
        data: Box::new(ExifData::new()),
        warnings: Vec::new(),
    };
    let mut ctx = ReadContext {
        data: &mut *result.data,
        warnings: &mut result.warnings,
        options,
    };

    let registry = HandlerRegistry::new();
    match registry.find_by_detection(buf) {
        Some(handler) => {
            debug!("detected {} container", handler.format_name());
            handler.read_metadata(buf, &mut ctx)?;
        }
        None => {
            // Best-effort fallback: sweep the buffer for embedded metadata.
            debug!("no container handler matched, scanning for embedded Exif");
            scan::read_scanned(buf, &mut ctx).map_err(|_| {
                ExifError::UnknownFileType("cannot determine file type".to_string())
            })?;
        }
    }

    Ok(result)
}

/// Parse metadata from a file with default (lenient) options.
pub fn read_file(path: impl AsRef<Path>) -> ExifResult<ParsedExif> {
    read_file_with(path, ReadOptions::default())
}

/// Memory-map a file and parse its metadata.
pub fn read_file_with(path: impl AsRef<Path>, options: ReadOptions) -> ExifResult<ParsedExif> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| ExifError::CannotOpenFile(format!("{}: {e}", path.display())))?;
    let map = unsafe { Mmap::map(&file) }
        .map_err(|e| ExifError::CannotOpenFile(format!("{}: {e}", path.display())))?;
    if map.len() < MIN_FILE_LEN {
        return Err(ExifError::CorruptData("file too small".to_string()));
    }
    read_bytes_with(&map, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiny_buffer_rejected() {
        let res = read_bytes(&[0x49, 0x49]);
        assert!(matches!(res, Err(ExifError::CorruptData(_))));
    }

    #[test]
    fn test_unknown_container_rejected() {
        let res = read_bytes(&[0u8; 256]);
        assert!(matches!(res, Err(ExifError::UnknownFileType(_))));
    }

    #[test]
    fn test_scan_fallback_on_unknown_container() {
        // An unrecognized blob with an embedded Exif TIFF
        let mut buf = vec![0xABu8; 40];
        buf.extend_from_slice(b"Exif\0\0");
        buf.extend_from_slice(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]);
        buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        let parsed = read_bytes(&buf).unwrap();
        assert_eq!(parsed.data.num_images(), 1);
    }

    #[test]
    fn test_missing_file() {
        let res = read_file("/nonexistent/image.tiff");
        assert!(matches!(res, Err(ExifError::CannotOpenFile(_))));
    }
}
