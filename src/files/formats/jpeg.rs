//! JPEG container handler
//!
//! Walks the segment stream after the SOI marker looking for an APP1 segment
//! carrying an `Exif\0\0` header, and reparses its payload as a TIFF stream.
//! The walk stops at SOS (entropy-coded data follows, segment structure is
//! unreliable past it) or EOI.

use crate::core::cursor::{ByteCursor, Endian};
use crate::core::error::{ExifError, ExifResult, ParseWarning};
use crate::core::metadata::{FileType, FileVariant};
use crate::core::parser;
use crate::files::handler::{ContainerHandler, ReadContext};
use log::trace;

const MARKER_SOI: u16 = 0xFFD8;
const MARKER_EOI: u16 = 0xFFD9;
const MARKER_SOS: u16 = 0xFFDA;
const MARKER_APP1: u16 = 0xFFE1;

const EXIF_HEADER: &[u8] = b"Exif\0\0";

#[derive(Debug, Clone, Copy)]
pub struct JpegHandler;

impl ContainerHandler for JpegHandler {
    fn can_handle(&self, buf: &[u8]) -> bool {
        buf.len() >= 3 && buf[0] == 0xFF && buf[1] == 0xD8 && buf[2] == 0xFF
    }

    fn read_metadata(&self, buf: &[u8], ctx: &mut ReadContext<'_>) -> ExifResult<()> {
        ctx.data.file_type = FileType::Jpeg;
        ctx.data.variant = FileVariant::Standard;

        // Segment lengths are always big-endian, regardless of the byte
        // order of any embedded TIFF stream.
        let mut cursor = ByteCursor::new(buf, Endian::Big);
        cursor.seek(2)?; // past SOI

        loop {
            let marker = match cursor.read_u16() {
                Ok(m) => m,
                Err(_) => break, // ran off the end without SOS/EOI
            };
            match marker {
                MARKER_SOI => continue,
                MARKER_EOI | MARKER_SOS => break,
                MARKER_APP1 => {
                    let length = cursor.read_u16()? as usize;
                    if length < 2 {
                        return Err(ExifError::CorruptData(
                            "JPEG segment length too small".to_string(),
                        ));
                    }
                    let payload_start = cursor.pos();
                    let payload = cursor.view(payload_start, length - 2)?;
                    if payload.starts_with(EXIF_HEADER) {
                        let tiff = &payload[EXIF_HEADER.len()..];
                        return parser::read_tiff(
                            tiff,
                            ctx.data,
                            ctx.warnings,
                            ctx.options.is_strict(),
                        );
                    }
                    // Not Exif (XMP shares APP1); keep walking.
                    trace!("skipping non-Exif APP1 segment");
                    cursor.skip(length - 2)?;
                }
                _ => {
                    if marker & 0xFF00 != 0xFF00 {
                        return Err(ExifError::CorruptData(format!(
                            "invalid JPEG marker 0x{marker:04x}"
                        )));
                    }
                    // Length includes its own two bytes.
                    let length = cursor.read_u16()? as usize;
                    if length < 2 {
                        return Err(ExifError::CorruptData(
                            "JPEG segment length too small".to_string(),
                        ));
                    }
                    cursor.skip(length - 2)?;
                }
            }
        }

        if ctx.options.is_strict() {
            return Err(ExifError::TagNotFound(
                "no Exif APP1 segment found".to_string(),
            ));
        }
        ctx.warnings
            .push(ParseWarning::new("no Exif APP1 segment found"));
        Ok(())
    }

    fn format_name(&self) -> &'static str {
        "JPEG"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["jpg", "jpeg"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::ExifData;
    use crate::files::handler::ReadOptions;

    fn read(buf: &[u8]) -> (ExifData, Vec<ParseWarning>) {
        let mut data = ExifData::new();
        let mut warnings = Vec::new();
        let mut ctx = ReadContext {
            data: &mut data,
            warnings: &mut warnings,
            options: ReadOptions::default(),
        };
        JpegHandler.read_metadata(buf, &mut ctx).unwrap();
        (data, warnings)
    }

    #[test]
    fn test_can_handle() {
        assert!(JpegHandler.can_handle(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!JpegHandler.can_handle(&[0x49, 0x49, 0x2A, 0x00]));
        assert!(!JpegHandler.can_handle(&[0xFF, 0xD8]));
    }

    #[test]
    fn test_minimal_jpeg_without_exif_warns() {
        let (_, warnings) = read(&[0xFF, 0xD8, 0xFF, 0xD9]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("no Exif"));
    }

    #[test]
    fn test_skips_foreign_app1() {
        // APP1 with an XMP-style payload, then EOI
        let mut buf = vec![0xFF, 0xD8, 0xFF, 0xE1];
        let payload = b"http://ns.adobe.com/xap/1.0/\0";
        buf.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        buf.extend_from_slice(payload);
        buf.extend_from_slice(&[0xFF, 0xD9]);
        let (_, warnings) = read(&buf);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_embedded_exif() {
        // APP1 wrapping a minimal TIFF stream
        let mut tiff = Vec::new();
        tiff.extend_from_slice(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]);
        tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

        let mut buf = vec![0xFF, 0xD8, 0xFF, 0xE1];
        let length = 2 + EXIF_HEADER.len() + tiff.len();
        buf.extend_from_slice(&(length as u16).to_be_bytes());
        buf.extend_from_slice(EXIF_HEADER);
        buf.extend_from_slice(&tiff);
        buf.extend_from_slice(&[0xFF, 0xD9]);

        let (data, warnings) = read(&buf);
        assert_eq!(data.file_type, FileType::Jpeg);
        assert_eq!(data.num_images(), 1);
        assert!(warnings.is_empty());
    }
}
