//! TIFF directory parser
//!
//! Walks the linked chain of image file directories rooted in a TIFF stream,
//! dispatches each entry to the decoder, and collects cross-directory
//! references (EXIF sub-IFD, generic sub-IFDs, maker notes) into a queue that
//! drains after the top-level chain. Collect-then-drain keeps the cursor
//! state non-reentrant.

use crate::core::cursor::{ByteCursor, Endian};
use crate::core::decoder::{decode_entry, fetch_scalar, IfdEntry};
use crate::core::error::{ExifError, ExifResult, ParseWarning};
use crate::core::metadata::ExifData;
use crate::core::schema::{self, context, tags, DType};
use crate::makernote;
use log::{debug, trace};

/// Maximum number of directories followed along one linked chain.
const MAX_IFD_CHAIN: usize = 5;
/// Maximum number of queued sub-IFD references per file.
const MAX_SUBIFD_REFS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubIfdKind {
    Exif,
    Image,
    MakerNote,
    Gps,
    Interop,
}

#[derive(Debug, Clone, Copy)]
struct SubIfdRef {
    offset: u32,
    length: u32,
    kind: SubIfdKind,
}

/// Parse a TIFF stream (starting at its "II"/"MM" byte-order mark) into
/// `data`. The slice must be the complete stream: entry payload offsets are
/// absolute within it.
pub(crate) fn read_tiff(
    buf: &[u8],
    data: &mut ExifData,
    warnings: &mut Vec<ParseWarning>,
    strict: bool,
) -> ExifResult<()> {
    let order = detect_byte_order(buf)?;
    let mut parser = TiffParser {
        cursor: ByteCursor::new(buf, order),
        data,
        warnings,
        strict,
        queue: Vec::new(),
    };
    parser.run()
}

/// Detect the stream byte order from the "II"/"MM" mark.
pub(crate) fn detect_byte_order(buf: &[u8]) -> ExifResult<Endian> {
    match buf.get(0..2) {
        Some(b"II") => Ok(Endian::Little),
        Some(b"MM") => Ok(Endian::Big),
        _ => Err(ExifError::CorruptData(
            "not a TIFF stream: II or MM header not found".to_string(),
        )),
    }
}

struct TiffParser<'a, 'b> {
    cursor: ByteCursor<'a>,
    data: &'b mut ExifData,
    warnings: &'b mut Vec<ParseWarning>,
    strict: bool,
    queue: Vec<SubIfdRef>,
}

impl<'a> TiffParser<'a, '_> {
    fn run(&mut self) -> ExifResult<()> {
        self.cursor.seek(4)?;
        let root_offset = self.cursor.read_u32()?;
        trace!("root IFD offset: {}", root_offset);

        self.walk_chain(root_offset, context::ROOT, true)?;
        self.drain_queue()
    }

    /// Record a recoverable anomaly: an error in strict mode, a warning
    /// otherwise.
    fn anomaly(&mut self, message: &str, what: Option<&str>) -> ExifResult<()> {
        if self.strict {
            return Err(ExifError::CorruptData(match what {
                Some(w) => format!("{message} ({w})"),
                None => message.to_string(),
            }));
        }
        self.warnings.push(match what {
            Some(w) => ParseWarning::with_what(message, w),
            None => ParseWarning::new(message),
        });
        Ok(())
    }

    /// Follow a linked directory chain. The first directory uses `ctx`;
    /// subsequent hops are thumbnails. Each hop claims an image slot when
    /// `with_images` is set.
    fn walk_chain(&mut self, start: u32, ctx: u16, with_images: bool) -> ExifResult<()> {
        let mut offset = start;
        let mut ctx = ctx;
        let mut hops = 0;
        loop {
            let image_idx = if with_images {
                let Some(idx) = self.data.alloc_image() else {
                    self.warnings
                        .push(ParseWarning::new("too many images, directory dropped"));
                    return Ok(());
                };
                Some(idx)
            } else {
                None
            };

            let next = match self.parse_ifd(offset, ctx, image_idx) {
                Ok(next) => next,
                Err(err @ ExifError::InternalError(_)) => return Err(err),
                Err(err) if self.strict => return Err(err),
                Err(err) => {
                    self.warnings
                        .push(ParseWarning::new(format!("directory skipped: {err}")));
                    return Ok(());
                }
            };

            hops += 1;
            if next == 0 {
                return Ok(());
            }
            if next as usize >= self.cursor.len() {
                self.anomaly("next IFD offset out of bounds", None)?;
                return Ok(());
            }
            if next % 2 != 0 {
                self.anomaly("IFD must align to word boundary", None)?;
            }
            if hops >= MAX_IFD_CHAIN {
                self.warnings
                    .push(ParseWarning::new("directory chain too long, truncated"));
                return Ok(());
            }
            offset = next;
            ctx = if ctx == context::ROOT { context::THUMB } else { ctx };
        }
    }

    /// Parse one directory; returns the offset of the next directory in the
    /// chain (0 terminates).
    fn parse_ifd(&mut self, offset: u32, ctx: u16, image_idx: Option<usize>) -> ExifResult<u32> {
        self.cursor.seek(offset as usize)?;
        let num_entries = self.cursor.read_u16()?;
        trace!("IFD at {}: {} entries", offset, num_entries);

        // The whole entry table plus next-pointer must lie within the file.
        let table_len = num_entries as usize * IfdEntry::BINARY_SIZE + 4;
        if self.cursor.pos() + table_len > self.cursor.len() {
            return Err(ExifError::CorruptData(
                "IFD entry table extends past end of stream".to_string(),
            ));
        }

        for _ in 0..num_entries {
            let entry = IfdEntry::read(&mut self.cursor)?;
            if self.intercept_structural(&entry)? {
                continue;
            }
            if DType::from_code(entry.dtype_code).is_none() {
                self.warnings
                    .push(ParseWarning::new("unknown IFD entry data type"));
                continue;
            }
            let Some(def) = schema::find(entry.tag, ctx) else {
                trace!("unknown tag 0x{:04x} skipped", entry.tag);
                continue;
            };
            match decode_entry(
                &entry,
                def,
                &self.cursor,
                self.data,
                image_idx,
                self.warnings,
                self.strict,
            ) {
                Ok(()) => {}
                Err(err @ ExifError::InternalError(_)) => return Err(err),
                Err(err) if self.strict => return Err(err),
                Err(err) => self
                    .warnings
                    .push(ParseWarning::with_what(err.to_string(), def.name)),
            }
        }

        Ok(self.cursor.read_u32()?)
    }

    /// Handle tags that address other directories rather than values. Returns
    /// true when the entry was consumed.
    fn intercept_structural(&mut self, entry: &IfdEntry) -> ExifResult<bool> {
        let kind = match entry.tag {
            tags::EXIF_OFFSET => SubIfdKind::Exif,
            tags::SUB_IFD_OFFSET => SubIfdKind::Image,
            tags::MAKERNOTE | tags::MAKERNOTE_ALT => SubIfdKind::MakerNote,
            tags::GPS_OFFSET => SubIfdKind::Gps,
            tags::INTEROP_OFFSET => SubIfdKind::Interop,
            _ => return Ok(false),
        };
        let order = self.cursor.order();
        match kind {
            SubIfdKind::Exif | SubIfdKind::Gps | SubIfdKind::Interop => {
                if entry.dtype_code != DType::Long as u16 || entry.count != 1 {
                    self.anomaly("sub-IFD pointer has wrong type or count", None)?;
                    return Ok(true);
                }
                self.enqueue(SubIfdRef {
                    offset: entry.offset(order),
                    length: 0,
                    kind,
                });
            }
            SubIfdKind::Image => {
                if entry.dtype_code != DType::Long as u16 {
                    self.anomaly("sub-IFD pointer list has wrong type", None)?;
                    return Ok(true);
                }
                for i in 0..entry.count as usize {
                    let offset = fetch_scalar(entry, DType::Long, i, &self.cursor)?;
                    self.enqueue(SubIfdRef {
                        offset,
                        length: 0,
                        kind,
                    });
                }
            }
            SubIfdKind::MakerNote => {
                if entry.dtype_code != DType::Undefined as u16 {
                    self.anomaly("maker note has wrong data type", None)?;
                    return Ok(true);
                }
                self.enqueue(SubIfdRef {
                    offset: entry.offset(order),
                    length: entry.count,
                    kind,
                });
            }
        }
        Ok(true)
    }

    fn enqueue(&mut self, r: SubIfdRef) {
        if self.queue.len() >= MAX_SUBIFD_REFS {
            self.warnings
                .push(ParseWarning::new("too many sub-IFD references, dropped"));
            return;
        }
        trace!("queued {:?} sub-IFD at offset {}", r.kind, r.offset);
        self.queue.push(r);
    }

    /// Drain queued references in enqueue order. References enqueued while
    /// draining (e.g. a maker note inside the EXIF sub-IFD) are processed in
    /// the same pass.
    fn drain_queue(&mut self) -> ExifResult<()> {
        let mut i = 0;
        while i < self.queue.len() {
            let r = self.queue[i];
            i += 1;
            match r.kind {
                SubIfdKind::Exif => {
                    self.walk_chain(r.offset, context::EXIF, false)?;
                }
                SubIfdKind::Image => {
                    self.walk_chain(r.offset, context::ROOT, true)?;
                }
                SubIfdKind::MakerNote => {
                    let result = makernote::parse(
                        self.cursor.data(),
                        r.offset,
                        r.length,
                        self.data,
                        self.warnings,
                        self.strict,
                    );
                    match result {
                        Ok(()) => {}
                        Err(err @ ExifError::InternalError(_)) => return Err(err),
                        Err(err) if self.strict => return Err(err),
                        Err(err) => self
                            .warnings
                            .push(ParseWarning::with_what(err.to_string(), "MakerNote")),
                    }
                }
                SubIfdKind::Gps | SubIfdKind::Interop => {
                    debug!("unsupported {:?} sub-IFD skipped", r.kind);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal little-endian TIFF: header + one directory with zero entries.
    fn minimal_tiff() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]);
        buf.extend_from_slice(&[0x00, 0x00]); // entry count
        buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // next IFD
        buf
    }

    #[test]
    fn test_minimal_tiff() {
        let buf = minimal_tiff();
        let mut data = ExifData::new();
        let mut warnings = Vec::new();
        read_tiff(&buf, &mut data, &mut warnings, false).unwrap();
        assert_eq!(data.num_images(), 1);
        assert!(warnings.is_empty());
        assert!(!data.make.is_set());
    }

    #[test]
    fn test_bad_byte_order_mark() {
        let mut buf = minimal_tiff();
        buf[0] = b'X';
        let mut data = ExifData::new();
        let mut warnings = Vec::new();
        let res = read_tiff(&buf, &mut data, &mut warnings, false);
        assert!(matches!(res, Err(ExifError::CorruptData(_))));
    }

    #[test]
    fn test_entry_table_out_of_bounds() {
        let mut buf = minimal_tiff();
        // Claim 100 entries in a 14-byte file
        buf[8] = 100;
        let mut data = ExifData::new();
        let mut warnings = Vec::new();
        // Lenient mode converts the failed root directory into a warning
        read_tiff(&buf, &mut data, &mut warnings, false).unwrap();
        assert_eq!(warnings.len(), 1);
        // Strict mode propagates
        let mut data = ExifData::new();
        let mut warnings = Vec::new();
        let res = read_tiff(&buf, &mut data, &mut warnings, true);
        assert!(matches!(res, Err(ExifError::CorruptData(_))));
    }

    #[test]
    fn test_gps_pointer_is_skipped() {
        // One directory with a single GPS pointer entry
        let mut buf = Vec::new();
        buf.extend_from_slice(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]);
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&tags::GPS_OFFSET.to_le_bytes());
        buf.extend_from_slice(&4u16.to_le_bytes()); // LONG
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&26u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes()); // next
        let mut data = ExifData::new();
        let mut warnings = Vec::new();
        read_tiff(&buf, &mut data, &mut warnings, false).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(data.num_images(), 1);
    }
}
