//! Directory entry decoder
//!
//! Takes a raw 12-byte directory entry plus its schema row, reads the payload
//! (inline or at an absolute offset), applies the stream byte order, and
//! writes the decoded value into its destination field. Type mismatches that
//! still "fit" decode with a warning; mismatches that don't are ignored (or
//! fail the parse in strict mode).

use crate::core::cursor::{ByteCursor, Endian};
use crate::core::error::{ExifError, ExifResult, ParseWarning};
use crate::core::metadata::{ExifData, Orientation, SubfileKind};
use crate::core::schema::{self, DType, Field, TagDef, ValueKind};
use crate::types::{subsec_millis, DateTime, Illuminant, SRational, StrRef, URational, Vla};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::trace;

/// A raw directory entry as stored on the wire.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IfdEntry {
    pub tag: u16,
    pub dtype_code: u16,
    pub count: u32,
    /// Inline payload in stream order: the value itself if it fits in four
    /// bytes, otherwise an absolute offset into the stream.
    pub payload: [u8; 4],
}

impl IfdEntry {
    pub const BINARY_SIZE: usize = 12;

    pub fn read(cursor: &mut ByteCursor<'_>) -> ExifResult<Self> {
        Ok(Self {
            tag: cursor.read_u16()?,
            dtype_code: cursor.read_u16()?,
            count: cursor.read_u32()?,
            payload: cursor.read_raw4()?,
        })
    }

    /// The inline payload interpreted as an absolute offset.
    pub fn offset(&self, order: Endian) -> u32 {
        match order {
            Endian::Little => LittleEndian::read_u32(&self.payload),
            Endian::Big => BigEndian::read_u32(&self.payload),
        }
    }

    /// Total payload size on the wire.
    pub fn byte_len(&self, dtype: DType) -> usize {
        dtype.size() * self.count as usize
    }
}

/// Fetch element `idx` of an integral entry as an unsigned 32-bit value,
/// reading inline or through the payload offset as appropriate.
pub(crate) fn fetch_scalar(
    entry: &IfdEntry,
    dtype: DType,
    idx: usize,
    cursor: &ByteCursor<'_>,
) -> ExifResult<u32> {
    let elem = dtype.size();
    debug_assert!(elem <= 4);
    let inline;
    let bytes: &[u8] = if entry.byte_len(dtype) <= 4 {
        inline = entry.payload;
        &inline[idx * elem..(idx + 1) * elem]
    } else {
        let off = (entry.offset(cursor.order()) as usize)
            .checked_add(idx * elem)
            .ok_or_else(|| ExifError::CorruptData("payload offset overflow".to_string()))?;
        cursor.view(off, elem)?
    };
    Ok(match (elem, cursor.order()) {
        (1, _) => bytes[0] as u32,
        (2, Endian::Little) => LittleEndian::read_u16(bytes) as u32,
        (2, Endian::Big) => BigEndian::read_u16(bytes) as u32,
        (4, Endian::Little) => LittleEndian::read_u32(bytes),
        (4, Endian::Big) => BigEndian::read_u32(bytes),
        _ => 0,
    })
}

/// Read rational pair `idx` of an entry's payload. Both halves are swapped
/// independently.
fn urational_at(entry: &IfdEntry, cursor: &ByteCursor<'_>, idx: usize) -> ExifResult<URational> {
    let off = (entry.offset(cursor.order()) as usize)
        .checked_add(idx * 8)
        .ok_or_else(|| ExifError::CorruptData("payload offset overflow".to_string()))?;
    let mut c = cursor.at(off)?;
    Ok(URational::new(c.read_u32()?, c.read_u32()?))
}

fn srational_at(entry: &IfdEntry, cursor: &ByteCursor<'_>, idx: usize) -> ExifResult<SRational> {
    let off = (entry.offset(cursor.order()) as usize)
        .checked_add(idx * 8)
        .ok_or_else(|| ExifError::CorruptData("payload offset overflow".to_string()))?;
    let mut c = cursor.at(off)?;
    Ok(SRational::new(c.read_i32()?, c.read_i32()?))
}

/// The entry's raw text bytes, inline or out-of-line.
fn text_bytes<'e>(
    entry: &'e IfdEntry,
    dtype: DType,
    cursor: &ByteCursor<'e>,
) -> ExifResult<&'e [u8]> {
    let len = entry.byte_len(dtype);
    if len <= 4 {
        Ok(&entry.payload[..len])
    } else {
        cursor.view(entry.offset(cursor.order()) as usize, len)
    }
}

fn trim_trailing_nul(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == 0 {
        end -= 1;
    }
    &bytes[..end]
}

/// Decode one entry into its destination field.
///
/// Recoverable anomalies either push a warning or, where the payload cannot
/// be read at all, surface as `Err` for the parser to gate on strict mode.
/// Arena exhaustion (`InternalError`) always propagates.
pub(crate) fn decode_entry(
    entry: &IfdEntry,
    def: &TagDef,
    cursor: &ByteCursor<'_>,
    data: &mut ExifData,
    image_idx: Option<usize>,
    warnings: &mut Vec<ParseWarning>,
    strict: bool,
) -> ExifResult<()> {
    let Some(wire) = DType::from_code(entry.dtype_code) else {
        warnings.push(ParseWarning::with_what(
            "unknown IFD entry data type",
            def.name,
        ));
        return Ok(());
    };
    // An empty payload decodes to an unset tag.
    if entry.count == 0 {
        return Ok(());
    }

    let matches = schema::matches(def.kind, wire);
    let fits = schema::fits(def.kind, wire);
    if !matches && !fits {
        if strict {
            return Err(ExifError::CorruptData(format!(
                "dtype {} invalid for {}",
                wire.name(),
                def.name
            )));
        }
        warnings.push(ParseWarning::with_what("dtype in tag is incorrect", def.name));
        return Ok(());
    }
    if !matches {
        warnings.push(ParseWarning::with_what(
            "dtype did not match, but fits",
            def.name,
        ));
    }
    if let Some(expected) = def.count.expects() {
        if entry.count != expected {
            warnings.push(ParseWarning::with_what("unexpected count for tag", def.name));
        }
    }

    match def.kind {
        ValueKind::U16 => {
            let v = fetch_scalar(entry, wire, 0, cursor)? as u16;
            assign_u16(data, image_idx, def.field, v, entry.tag);
        }
        ValueKind::U32 => {
            let v = fetch_scalar(entry, wire, 0, cursor)?;
            assign_u32(data, image_idx, def.field, v, entry.tag);
        }
        ValueKind::Enum16 => {
            let code = fetch_scalar(entry, wire, 0, cursor)? as u16;
            assign_enum16(data, image_idx, def, code, entry.tag, warnings);
        }
        ValueKind::URational => decode_urational(entry, def, cursor, data, image_idx, warnings)?,
        ValueKind::SRational => decode_srational(entry, def, cursor, data, warnings)?,
        ValueKind::Text => {
            if matches!(def.field, Field::InteropIndex | Field::InteropVersion) {
                // Listed for diagnostics only; no interop decoder is wired.
                trace!("skipping interop tag 0x{:04x}", entry.tag);
                return Ok(());
            }
            let raw = trim_trailing_nul(text_bytes(entry, wire, cursor)?);
            if raw.is_empty() {
                return Ok(());
            }
            let stored = data.store_bytes(raw)?;
            assign_text(data, def.field, stored, entry.tag);
        }
        ValueKind::DateTime => {
            let raw = text_bytes(entry, wire, cursor)?;
            let parsed = DateTime::parse(raw)?;
            let slot = match def.field {
                Field::DateTime => &mut data.date_time,
                Field::DateTimeOriginal => &mut data.exif.date_time_original,
                Field::DateTimeDigitized => &mut data.exif.date_time_digitized,
                _ => return Ok(()),
            };
            let mut dt = parsed;
            // A sub-second companion tag may have merged milliseconds in
            // before this entry decoded.
            if dt.millis == 0 {
                dt.millis = slot.raw_value().millis;
            }
            slot.set_from(dt, entry.tag);
        }
        ValueKind::SubSec => {
            let raw = text_bytes(entry, wire, cursor)?;
            let millis = subsec_millis(raw);
            let slot = match def.field {
                Field::SubSecTime => &mut data.date_time,
                Field::SubSecTimeOriginal => &mut data.exif.date_time_original,
                Field::SubSecTimeDigitized => &mut data.exif.date_time_digitized,
                _ => return Ok(()),
            };
            slot.raw_value_mut().millis = millis;
        }
    }
    Ok(())
}

fn assign_u16(data: &mut ExifData, image_idx: Option<usize>, field: Field, v: u16, tag: u16) {
    match field {
        Field::Compression => {
            if let Some(i) = image_idx {
                data.image_mut(i).compression.set_from(v, tag);
            }
        }
        Field::PhotometricInterpretation => {
            if let Some(i) = image_idx {
                data.image_mut(i).photometric_interpretation.set_from(v, tag);
            }
        }
        Field::SamplesPerPixel => {
            if let Some(i) = image_idx {
                data.image_mut(i).samples_per_pixel.set_from(v, tag);
            }
        }
        Field::ResolutionUnit => {
            if let Some(i) = image_idx {
                data.image_mut(i).resolution_unit.set_from(v, tag);
            }
        }
        Field::OldSubfileType => {
            if let Some(i) = image_idx {
                data.image_mut(i).kind = match v {
                    1 => SubfileKind::FullResolution,
                    2 => SubfileKind::ReducedResolution,
                    _ => SubfileKind::Other,
                };
            }
        }
        Field::Iso => data.exif.iso.set_from(v, tag),
        Field::ExposureProgram => data.exif.exposure_program.set_from(v, tag),
        _ => trace!("no u16 destination for tag 0x{:04x}", tag),
    }
}

fn assign_u32(data: &mut ExifData, image_idx: Option<usize>, field: Field, v: u32, tag: u16) {
    match field {
        Field::ImageWidth => {
            if let Some(i) = image_idx {
                data.image_mut(i).image_width.set_from(v, tag);
            }
        }
        Field::ImageHeight => {
            if let Some(i) = image_idx {
                data.image_mut(i).image_height.set_from(v, tag);
            }
        }
        Field::DataOffset => {
            if let Some(i) = image_idx {
                data.image_mut(i).data_offset.set_from(v, tag);
            }
        }
        Field::DataLength => {
            if let Some(i) = image_idx {
                data.image_mut(i).data_length.set_from(v, tag);
            }
        }
        Field::SubfileType => {
            if let Some(i) = image_idx {
                data.image_mut(i).kind = match v {
                    0 => SubfileKind::FullResolution,
                    1 => SubfileKind::ReducedResolution,
                    _ => SubfileKind::Other,
                };
            }
        }
        Field::BitsPerSample => trace!("bits-per-sample not retained"),
        _ => trace!("no u32 destination for tag 0x{:04x}", tag),
    }
}

fn assign_enum16(
    data: &mut ExifData,
    image_idx: Option<usize>,
    def: &TagDef,
    code: u16,
    tag: u16,
    warnings: &mut Vec<ParseWarning>,
) {
    match def.field {
        Field::Orientation => {
            let Some(ori) = Orientation::from_code(code) else {
                warnings.push(ParseWarning::with_what("invalid orientation value", def.name));
                return;
            };
            if let Some(i) = image_idx {
                data.image_mut(i).orientation.set_from(ori, tag);
            }
        }
        Field::CalibrationIlluminant1 => {
            data.calibration_illuminant_1
                .set_from(Illuminant::from_code(code), tag);
        }
        Field::CalibrationIlluminant2 => {
            data.calibration_illuminant_2
                .set_from(Illuminant::from_code(code), tag);
        }
        _ => trace!("no enum destination for tag 0x{:04x}", tag),
    }
}

fn assign_text(data: &mut ExifData, field: Field, r: StrRef, tag: u16) {
    let slot = match field {
        Field::Copyright => &mut data.copyright,
        Field::Artist => &mut data.artist,
        Field::Make => &mut data.make,
        Field::Model => &mut data.model,
        Field::Software => &mut data.software,
        Field::ProcessingSoftware => &mut data.processing_software,
        Field::ExifVersion => &mut data.exif.exif_version,
        Field::CameraOwnerName => &mut data.exif.camera_owner_name,
        Field::BodySerialNumber => &mut data.exif.body_serial_number,
        Field::LensMake => &mut data.exif.lens_make,
        Field::LensModel => &mut data.exif.lens_model,
        Field::LensSerialNumber => &mut data.exif.lens_serial_number,
        Field::ImageTitle => &mut data.exif.image_title,
        Field::Photographer => &mut data.exif.photographer,
        Field::ImageEditor => &mut data.exif.image_editor,
        Field::RawDevelopingSoftware => &mut data.exif.raw_developing_software,
        Field::ImageEditingSoftware => &mut data.exif.image_editing_software,
        Field::MetadataEditingSoftware => &mut data.exif.metadata_editing_software,
        _ => {
            trace!("no text destination for tag 0x{:04x}", tag);
            return;
        }
    };
    slot.set_from(r, tag);
}

fn decode_urational(
    entry: &IfdEntry,
    def: &TagDef,
    cursor: &ByteCursor<'_>,
    data: &mut ExifData,
    image_idx: Option<usize>,
    warnings: &mut Vec<ParseWarning>,
) -> ExifResult<()> {
    let tag = entry.tag;
    match def.field {
        Field::XResolution | Field::YResolution => {
            let v = urational_at(entry, cursor, 0)?;
            if let Some(i) = image_idx {
                let img = data.image_mut(i);
                match def.field {
                    Field::XResolution => img.x_resolution.set_from(v, tag),
                    _ => img.y_resolution.set_from(v, tag),
                }
            }
        }
        Field::ExposureTime => {
            let v = urational_at(entry, cursor, 0)?;
            data.exif.exposure_time.set_from(v, tag);
        }
        Field::FNumber => {
            let v = urational_at(entry, cursor, 0)?;
            data.exif.f_number.set_from(v, tag);
        }
        Field::FocalLength => {
            let v = urational_at(entry, cursor, 0)?;
            data.exif.focal_length.set_from(v, tag);
        }
        Field::ApexAperture => {
            // Unsigned RATIONAL on the wire; the record keeps APEX values
            // signed.
            let v = urational_at(entry, cursor, 0)?;
            let v = SRational::new(
                v.num.min(i32::MAX as u32) as i32,
                v.denom.min(i32::MAX as u32) as i32,
            );
            data.apex_aperture.set_from(v, tag);
        }
        Field::LensSpecification => {
            let mut spec = [URational::default(); 4];
            let n = (entry.count as usize).min(4);
            for (i, slot) in spec.iter_mut().enumerate().take(n) {
                *slot = urational_at(entry, cursor, i)?;
            }
            data.exif.lens_specification.set_from(spec, tag);
        }
        Field::AsShotWhiteXy => {
            let mut xy = [URational::default(); 2];
            let n = (entry.count as usize).min(2);
            for (i, slot) in xy.iter_mut().enumerate().take(n) {
                *slot = urational_at(entry, cursor, i)?;
            }
            data.as_shot_white_xy.set_from(xy, tag);
        }
        Field::AsShotNeutral | Field::AnalogBalance => {
            let mut values: Vla<URational, 4> = Vla::new();
            for i in 0..entry.count as usize {
                let v = urational_at(entry, cursor, i)?;
                if !values.push(v) {
                    warnings.push(ParseWarning::with_what(
                        "excess array elements discarded",
                        def.name,
                    ));
                    break;
                }
            }
            match def.field {
                Field::AsShotNeutral => data.as_shot_neutral.set_from(values, tag),
                _ => data.analog_balance.set_from(values, tag),
            }
        }
        _ => trace!("no rational destination for tag 0x{:04x}", tag),
    }
    Ok(())
}

fn decode_srational(
    entry: &IfdEntry,
    def: &TagDef,
    cursor: &ByteCursor<'_>,
    data: &mut ExifData,
    warnings: &mut Vec<ParseWarning>,
) -> ExifResult<()> {
    let tag = entry.tag;
    match def.field {
        Field::ApexShutterSpeed => {
            let v = srational_at(entry, cursor, 0)?;
            data.apex_shutter_speed.set_from(v, tag);
        }
        Field::ColorMatrix1
        | Field::ColorMatrix2
        | Field::CalibrationMatrix1
        | Field::CalibrationMatrix2
        | Field::ReductionMatrix1
        | Field::ReductionMatrix2 => {
            let mut values: Vla<SRational, 12> = Vla::new();
            for i in 0..entry.count as usize {
                let v = srational_at(entry, cursor, i)?;
                if !values.push(v) {
                    warnings.push(ParseWarning::with_what(
                        "excess array elements discarded",
                        def.name,
                    ));
                    break;
                }
            }
            let slot = match def.field {
                Field::ColorMatrix1 => &mut data.color_matrix_1,
                Field::ColorMatrix2 => &mut data.color_matrix_2,
                Field::CalibrationMatrix1 => &mut data.calibration_matrix_1,
                Field::CalibrationMatrix2 => &mut data.calibration_matrix_2,
                Field::ReductionMatrix1 => &mut data.reduction_matrix_1,
                _ => &mut data.reduction_matrix_2,
            };
            slot.set_from(values, tag);
        }
        _ => trace!("no signed-rational destination for tag 0x{:04x}", tag),
    }
    Ok(())
}
