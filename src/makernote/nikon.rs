//! Nikon maker note decoder
//!
//! Nikon notes start with `Nikon\0`, a version word and padding; byte 10
//! onward is a self-contained TIFF stream with its own byte order and its
//! own offset base. The decoder walks its directories for the lens tags and
//! synthesizes a human-readable lens model name when the file carries none.

use crate::core::cursor::ByteCursor;
use crate::core::decoder::{decode_entry, fetch_scalar, IfdEntry};
use crate::core::error::{ExifError, ExifResult, ParseWarning};
use crate::core::metadata::ExifData;
use crate::core::parser::detect_byte_order;
use crate::core::schema::{self, context, tags, DType};
use log::trace;

pub(crate) const MAGIC: &[u8] = b"Nikon\0";

/// Bytes before the embedded TIFF stream: magic, version word, padding.
const HEADER_LEN: usize = 10;

/// Maximum directories followed inside a maker note.
const MAX_CHAIN: usize = 5;

/// Decode a Nikon maker note blob (including its `Nikon\0` header).
pub(crate) fn parse(
    note: &[u8],
    data: &mut ExifData,
    warnings: &mut Vec<ParseWarning>,
    strict: bool,
) -> ExifResult<()> {
    if note.len() <= HEADER_LEN {
        return Err(ExifError::CorruptData(
            "Nikon maker note too short".to_string(),
        ));
    }
    let stream = &note[HEADER_LEN..];
    let order = detect_byte_order(stream)?;
    let mut cursor = ByteCursor::new(stream, order);
    cursor.seek(4)?;
    let mut ifd_offset = cursor.read_u32()?;

    let mut lens_type: Option<u8> = None;
    let mut hops = 0;

    while ifd_offset != 0 && hops < MAX_CHAIN {
        cursor.seek(ifd_offset as usize)?;
        let num_entries = cursor.read_u16()?;
        trace!("Nikon IFD at {}: {} entries", ifd_offset, num_entries);

        for _ in 0..num_entries {
            let entry = IfdEntry::read(&mut cursor)?;
            match entry.tag {
                tags::NIKON_VERSION => {
                    // Four ASCII digits, e.g. "0211"
                    trace!(
                        "Nikon note version {:?}",
                        String::from_utf8_lossy(&entry.payload)
                    );
                }
                tags::NIKON_LENS_TYPE => {
                    lens_type = Some(fetch_scalar(&entry, DType::Byte, 0, &cursor)? as u8);
                }
                _ => {
                    let Some(def) = schema::find(entry.tag, context::MAKERNOTE) else {
                        continue;
                    };
                    match decode_entry(&entry, def, &cursor, data, None, warnings, strict) {
                        Ok(()) => {}
                        Err(err @ ExifError::InternalError(_)) => return Err(err),
                        Err(err) if strict => return Err(err),
                        Err(err) => {
                            warnings.push(ParseWarning::with_what(err.to_string(), def.name))
                        }
                    }
                }
            }
        }

        ifd_offset = cursor.read_u32()?;
        hops += 1;
    }

    if !data.exif.lens_model.is_set() {
        let spec = data.exif.lens_specification.get().copied();
        if let (Some(spec), Some(bits)) = (spec, lens_type) {
            let name = lens_name(spec.map(|r| r.to_f64()), bits);
            let stored = data.store_str(&name)?;
            data.exif
                .lens_model
                .set_from(stored, tags::NIKON_LENS_SPECIFICATION);
        }
    }
    Ok(())
}

/// Build a lens display name from the specification and the lens type
/// bitfield, e.g. "AF-P 18-55mm f/3.5-5.6G VR".
fn lens_name(spec: [f64; 4], bits: u8) -> String {
    let prefix = if bits & 0x80 != 0 {
        "AF-P "
    } else if bits & 0x01 == 0 {
        "AF "
    } else {
        "MF "
    };
    let mut suffix = String::new();
    if bits & 0x40 != 0 {
        suffix.push('E');
    } else if bits & 0x04 != 0 {
        suffix.push('G');
    } else if bits & 0x02 != 0 {
        suffix.push('D');
    }
    if bits & 0x08 != 0 {
        suffix.push_str(" VR");
    }

    let (min_focal, max_focal) = (spec[0], spec[1]);
    if min_focal == max_focal {
        format!("{}{}mm f/{}{}", prefix, min_focal as i32, spec[2], suffix)
    } else {
        format!(
            "{}{}-{}mm f/{}-{}{}",
            prefix, min_focal as i32, max_focal as i32, spec[2], spec[3], suffix
        )
    }
}
