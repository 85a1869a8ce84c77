//! TIFF serializer
//!
//! Emits a metadata record as a standalone TIFF byte stream, optionally
//! wrapped in a JPEG APP1 segment. Each directory is staged in two side
//! buffers (packed entries and out-of-line payloads); once the directory's
//! absolute position is known, every embedded payload offset is patched in
//! place. Cross-directory pointers use an outstanding-offset record that must
//! transition to written before emission completes.

use crate::core::metadata::ExifData;
use crate::core::schema::{tags, DType};
use crate::types::{DateTime, SRational, StrRef, Tag, URational};
use byteorder::{ByteOrder, NativeEndian};

/// Emit a raw TIFF stream for the record.
pub fn write_tiff(data: &ExifData) -> Vec<u8> {
    let mut w = TiffWriter::new(Vec::new(), 0);
    write_tiff_stream(&mut w, data);
    w.into_inner()
}

/// Emit the record as a JPEG APP1 segment: marker, big-endian size,
/// `Exif\0\0` header, TIFF stream. The caller inserts the segment after the
/// SOI marker of a JPEG file.
pub fn write_jpeg_app1(data: &ExifData) -> Vec<u8> {
    let mut buf = vec![0xFF, 0xE1, 0x00, 0x00];
    buf.extend_from_slice(b"Exif\0\0");
    let base = buf.len();
    let mut w = TiffWriter::new(buf, base);
    let tiff_len = write_tiff_stream(&mut w, data);
    let mut out = w.into_inner();
    // Size covers the size field itself, the Exif header and the TIFF
    // stream, but not the marker.
    let size = tiff_len + 8;
    debug_assert!(size <= u16::MAX as usize);
    out[2] = (size >> 8) as u8;
    out[3] = (size & 0xFF) as u8;
    out
}

/// Append-only writer with positions expressed relative to the TIFF base.
struct TiffWriter {
    buf: Vec<u8>,
    base: usize,
}

impl TiffWriter {
    fn new(buf: Vec<u8>, base: usize) -> Self {
        Self { buf, base }
    }

    fn pos(&self) -> usize {
        self.buf.len() - self.base
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u16(&mut self, v: u16) {
        let mut b = [0u8; 2];
        NativeEndian::write_u16(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    fn write_u32(&mut self, v: u32) {
        let mut b = [0u8; 4];
        NativeEndian::write_u32(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn overwrite_u32(&mut self, pos: usize, v: u32) {
        NativeEndian::write_u32(&mut self.buf[self.base + pos..self.base + pos + 4], v);
    }

    fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OffsetState {
    Waiting,
    Written,
}

/// A directory entry whose payload is the absolute position of another
/// directory that has not been emitted yet. The placeholder is patched when
/// the referent's position becomes known; dropping an unresolved record is a
/// programmer error.
struct OutstandingOffset {
    payload_pos: usize,
    state: OffsetState,
}

impl OutstandingOffset {
    fn resolve(&mut self, w: &mut TiffWriter, target: u32) {
        w.overwrite_u32(self.payload_pos, target);
        self.state = OffsetState::Written;
    }
}

impl Drop for OutstandingOffset {
    fn drop(&mut self) {
        debug_assert!(
            self.state == OffsetState::Written,
            "outstanding directory offset never written"
        );
    }
}

/// Staging area for one directory: packed entries and out-of-line payloads.
struct IfdBuilder<'a> {
    data: &'a ExifData,
    tags: Vec<u8>,
    payloads: Vec<u8>,
    num_entries: u16,
    pending_offsets: u16,
}

impl<'a> IfdBuilder<'a> {
    fn new(data: &'a ExifData) -> Self {
        Self {
            data,
            tags: Vec::new(),
            payloads: Vec::new(),
            num_entries: 0,
            pending_offsets: 0,
        }
    }

    /// Append a raw entry. A payload of at most four bytes is stored inline;
    /// anything larger lands in the payload buffer and the entry records a
    /// payload-relative offset to be patched at finalize time. Returns the
    /// entry's index.
    fn push_entry(&mut self, tag: u16, dtype: DType, count: u32, payload: &[u8]) -> u16 {
        let mut b2 = [0u8; 2];
        let mut b4 = [0u8; 4];
        NativeEndian::write_u16(&mut b2, tag);
        self.tags.extend_from_slice(&b2);
        NativeEndian::write_u16(&mut b2, dtype as u16);
        self.tags.extend_from_slice(&b2);
        NativeEndian::write_u32(&mut b4, count);
        self.tags.extend_from_slice(&b4);

        if payload.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..payload.len()].copy_from_slice(payload);
            self.tags.extend_from_slice(&inline);
        } else {
            let offset = self.payloads.len() as u32;
            self.payloads.extend_from_slice(payload);
            NativeEndian::write_u32(&mut b4, offset);
            self.tags.extend_from_slice(&b4);
            self.pending_offsets += 1;
        }

        let index = self.num_entries;
        self.num_entries += 1;
        index
    }

    fn push_u16(&mut self, tag: u16, value: u16) {
        let mut b = [0u8; 2];
        NativeEndian::write_u16(&mut b, value);
        self.push_entry(tag, DType::Short, 1, &b);
    }

    fn push_u32(&mut self, tag: u16, value: u32) -> u16 {
        let mut b = [0u8; 4];
        NativeEndian::write_u32(&mut b, value);
        self.push_entry(tag, DType::Long, 1, &b)
    }

    fn push_urational(&mut self, tag: u16, v: URational) {
        let mut b = [0u8; 8];
        NativeEndian::write_u32(&mut b[0..4], v.num);
        NativeEndian::write_u32(&mut b[4..8], v.denom);
        self.push_entry(tag, DType::Rational, 1, &b);
    }

    fn push_srational(&mut self, tag: u16, v: SRational) {
        let mut b = [0u8; 8];
        NativeEndian::write_i32(&mut b[0..4], v.num);
        NativeEndian::write_i32(&mut b[4..8], v.denom);
        self.push_entry(tag, DType::SRational, 1, &b);
    }

    fn push_urational_array(&mut self, tag: u16, values: &[URational]) {
        let mut b = Vec::with_capacity(values.len() * 8);
        for v in values {
            let mut pair = [0u8; 8];
            NativeEndian::write_u32(&mut pair[0..4], v.num);
            NativeEndian::write_u32(&mut pair[4..8], v.denom);
            b.extend_from_slice(&pair);
        }
        self.push_entry(tag, DType::Rational, values.len() as u32, &b);
    }

    /// Emit a string tag. Count is the byte length including the terminating
    /// NUL, which is written explicitly.
    fn push_str_bytes(&mut self, tag: u16, bytes: &[u8]) {
        let mut b = Vec::with_capacity(bytes.len() + 1);
        b.extend_from_slice(bytes);
        b.push(0);
        self.push_entry(tag, DType::Ascii, b.len() as u32, &b);
    }

    fn push_string_tag(&mut self, tag: u16, value: &Tag<StrRef>) {
        if let Some(&r) = value.get() {
            let bytes = self.data.bytes(r).to_vec();
            self.push_str_bytes(tag, &bytes);
        }
    }

    /// Emit a datetime tag and, when the record carries sub-second
    /// precision, its three-digit sub-second companion.
    fn push_datetime(&mut self, tag: u16, subsec_tag: u16, value: &Tag<DateTime>) {
        if let Some(dt) = value.get().copied() {
            self.push_str_bytes(tag, dt.format().as_bytes());
            if dt.millis != 0 {
                self.push_str_bytes(subsec_tag, format!("{:03}", dt.millis).as_bytes());
            }
        }
    }

    fn push_urational_tag(&mut self, tag: u16, value: &Tag<URational>) {
        if let Some(&v) = value.get() {
            self.push_urational(tag, v);
        }
    }

    fn push_srational_tag(&mut self, tag: u16, value: &Tag<SRational>) {
        if let Some(&v) = value.get() {
            self.push_srational(tag, v);
        }
    }

    fn push_u16_tag(&mut self, tag: u16, value: &Tag<u16>) {
        if let Some(&v) = value.get() {
            self.push_u16(tag, v);
        }
    }

    /// Write the staged directory at the writer's current position and patch
    /// every out-of-line payload offset to its absolute value. Returns the
    /// directory's absolute offset.
    fn finalize(self, w: &mut TiffWriter) -> u32 {
        let ifd_offset = w.pos() as u32;
        let data_start = ifd_offset
            + 2                                   // entry count
            + self.num_entries as u32 * IFD_ENTRY_SIZE as u32
            + 4; // next-directory slot

        let mut tags = self.tags;
        let mut patched = 0;
        for i in 0..self.num_entries as usize {
            let entry = &mut tags[i * IFD_ENTRY_SIZE..(i + 1) * IFD_ENTRY_SIZE];
            let dtype = NativeEndian::read_u16(&entry[2..4]);
            let count = NativeEndian::read_u32(&entry[4..8]);
            let required = DType::from_code(dtype).map_or(0, |d| d.size()) * count as usize;
            if required > 4 {
                let offset = NativeEndian::read_u32(&entry[8..12]);
                NativeEndian::write_u32(&mut entry[8..12], offset + data_start);
                patched += 1;
            }
        }
        debug_assert_eq!(patched, self.pending_offsets);

        w.write_u16(self.num_entries);
        w.write_bytes(&tags);
        w.write_u32(0); // next directory; single chains only
        w.write_bytes(&self.payloads);
        // Keep following directories word-aligned
        if self.payloads.len() % 2 != 0 {
            w.write_u8(0);
        }
        ifd_offset
    }
}

const IFD_ENTRY_SIZE: usize = 12;

/// Emit the full TIFF stream into the writer; returns its length.
fn write_tiff_stream(w: &mut TiffWriter, data: &ExifData) -> usize {
    let start = w.pos();

    // Header in host byte order
    if cfg!(target_endian = "little") {
        w.write_u8(b'I');
        w.write_u8(b'I');
    } else {
        w.write_u8(b'M');
        w.write_u8(b'M');
    }
    w.write_u16(42);
    w.write_u32(8); // root directory follows immediately

    // Root directory
    let mut root = IfdBuilder::new(data);
    root.push_string_tag(tags::COPYRIGHT, &data.copyright);
    root.push_string_tag(tags::ARTIST, &data.artist);
    root.push_string_tag(tags::MAKE, &data.make);
    root.push_string_tag(tags::MODEL, &data.model);
    root.push_string_tag(tags::SOFTWARE, &data.software);
    root.push_string_tag(tags::PROCESSING_SOFTWARE, &data.processing_software);
    root.push_datetime(tags::DATE_TIME, tags::SUBSEC_TIME, &data.date_time);
    // ApertureValue is unsigned RATIONAL on the wire even though the record
    // keeps APEX values signed.
    if let Some(&v) = data.apex_aperture.get() {
        root.push_urational(
            tags::APEX_APERTURE,
            URational::new(v.num.max(0) as u32, v.denom.max(0) as u32),
        );
    }
    root.push_srational_tag(tags::APEX_SHUTTER_SPEED, &data.apex_shutter_speed);
    let exif_pointer_index = root.push_u32(tags::EXIF_OFFSET, 0xFFFF);

    let root_offset = root.finalize(w);
    let mut exif_pointer = OutstandingOffset {
        payload_pos: root_offset as usize + 2 + exif_pointer_index as usize * IFD_ENTRY_SIZE + 8,
        state: OffsetState::Waiting,
    };

    // EXIF sub-IFD; its position is only known now, so patch the pointer.
    let exif_offset = w.pos() as u32;
    exif_pointer.resolve(w, exif_offset);

    let exif = &data.exif;
    let mut sub = IfdBuilder::new(data);
    sub.push_u32(tags::SUBFILE_TYPE, 1);
    sub.push_urational_tag(tags::EXPOSURE_TIME, &exif.exposure_time);
    sub.push_urational_tag(tags::F_NUMBER, &exif.f_number);
    sub.push_urational_tag(tags::FOCAL_LENGTH, &exif.focal_length);
    sub.push_u16_tag(tags::ISO, &exif.iso);
    sub.push_u16_tag(tags::EXPOSURE_PROGRAM, &exif.exposure_program);
    sub.push_datetime(
        tags::DATE_TIME_ORIGINAL,
        tags::SUBSEC_TIME_ORIGINAL,
        &exif.date_time_original,
    );
    sub.push_datetime(
        tags::DATE_TIME_DIGITIZED,
        tags::SUBSEC_TIME_DIGITIZED,
        &exif.date_time_digitized,
    );
    sub.push_string_tag(tags::CAMERA_OWNER_NAME, &exif.camera_owner_name);
    sub.push_string_tag(tags::BODY_SERIAL_NUMBER, &exif.body_serial_number);
    if let Some(spec) = exif.lens_specification.get() {
        sub.push_urational_array(tags::LENS_SPECIFICATION, spec);
    }
    sub.push_string_tag(tags::LENS_MAKE, &exif.lens_make);
    sub.push_string_tag(tags::LENS_MODEL, &exif.lens_model);
    sub.push_string_tag(tags::LENS_SERIAL_NUMBER, &exif.lens_serial_number);
    sub.push_string_tag(tags::IMAGE_TITLE, &exif.image_title);
    sub.push_string_tag(tags::PHOTOGRAPHER, &exif.photographer);
    sub.push_string_tag(tags::IMAGE_EDITOR, &exif.image_editor);
    sub.push_string_tag(tags::RAW_DEVELOPING_SOFTWARE, &exif.raw_developing_software);
    sub.push_string_tag(tags::IMAGE_EDITING_SOFTWARE, &exif.image_editing_software);
    sub.push_string_tag(
        tags::METADATA_EDITING_SOFTWARE,
        &exif.metadata_editing_software,
    );
    sub.finalize(w);

    w.pos() - start
}
