//! Tag schema
//!
//! A static table describing every tag the decoder understands: its numeric
//! ID, the directory contexts it may appear in, its expected on-wire type,
//! how its payload decodes, its cardinality rule, and the record field the
//! value lands in. The table drives decoding, encoding and diagnostics; there
//! is no per-tag code.

/// On-wire TIFF data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum DType {
    Byte = 1,
    Ascii = 2,
    Short = 3,
    Long = 4,
    Rational = 5,
    SByte = 6,
    Undefined = 7,
    SShort = 8,
    SLong = 9,
    SRational = 10,
    Float = 11,
    Double = 12,
}

impl DType {
    pub fn from_code(code: u16) -> Option<Self> {
        use DType::*;
        Some(match code {
            1 => Byte,
            2 => Ascii,
            3 => Short,
            4 => Long,
            5 => Rational,
            6 => SByte,
            7 => Undefined,
            8 => SShort,
            9 => SLong,
            10 => SRational,
            11 => Float,
            12 => Double,
            _ => return None,
        })
    }

    /// Bytes per element.
    pub fn size(self) -> usize {
        use DType::*;
        match self {
            Byte | Ascii | SByte | Undefined => 1,
            Short | SShort => 2,
            Long | SLong | Float => 4,
            Rational | SRational | Double => 8,
        }
    }

    pub fn name(self) -> &'static str {
        use DType::*;
        match self {
            Byte => "BYTE",
            Ascii => "ASCII",
            Short => "SHORT",
            Long => "LONG",
            Rational => "RATIONAL",
            SByte => "SBYTE",
            Undefined => "UNDEFINED",
            SShort => "SSHORT",
            SLong => "SLONG",
            SRational => "SRATIONAL",
            Float => "FLOAT",
            Double => "DOUBLE",
        }
    }
}

/// Directory context bits. A schema row's mask names every directory kind
/// that may carry the tag.
pub mod context {
    /// The primary image directory (IFD0)
    pub const ROOT: u16 = 0x0001;
    /// Thumbnail / reduced-resolution directories chained after IFD0
    pub const THUMB: u16 = 0x0002;
    /// The EXIF sub-IFD
    pub const EXIF: u16 = 0x0004;
    /// The GPS sub-IFD
    pub const GPS: u16 = 0x0008;
    /// The interoperability sub-IFD
    pub const INTEROP: u16 = 0x0010;
    /// Inside a manufacturer note
    pub const MAKERNOTE: u16 = 0x0020;

    pub const ROOT_THUMB: u16 = ROOT | THUMB;
    pub const ANY: u16 = 0xffff;
}

/// How many values an entry is expected to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountRule {
    /// Exactly one value
    Scalar,
    /// Exactly N values
    Fixed(u32),
    /// Up to N values
    Bounded(u32),
    /// A string of arbitrary byte length
    String,
    /// Free variable count
    Var,
}

impl CountRule {
    /// The exact count this rule demands, if it demands one.
    pub fn expects(self) -> Option<u32> {
        match self {
            CountRule::Scalar => Some(1),
            CountRule::Fixed(n) => Some(n),
            CountRule::Bounded(_) | CountRule::String | CountRule::Var => None,
        }
    }
}

/// How an entry's payload decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Unsigned 16-bit scalar
    U16,
    /// Unsigned 32-bit scalar
    U32,
    /// One or more unsigned rationals
    URational,
    /// One or more signed rationals
    SRational,
    /// Bytes copied to the string arena
    Text,
    /// `YYYY:MM:DD hh:mm:ss` timestamp string
    DateTime,
    /// Sub-second digit string merged into a datetime's milliseconds
    SubSec,
    /// 16-bit enumeration code (orientation, illuminant)
    Enum16,
}

/// Destination of a decoded value within the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    // Root record strings
    Copyright,
    Artist,
    Make,
    Model,
    Software,
    ProcessingSoftware,
    // Schema-listed but without a record destination (best-effort)
    InteropIndex,
    InteropVersion,
    BitsPerSample,
    // Root datetime and APEX values
    DateTime,
    ApexShutterSpeed,
    ApexAperture,
    // DNG color calibration
    ColorMatrix1,
    ColorMatrix2,
    CalibrationMatrix1,
    CalibrationMatrix2,
    ReductionMatrix1,
    ReductionMatrix2,
    CalibrationIlluminant1,
    CalibrationIlluminant2,
    AsShotNeutral,
    AsShotWhiteXy,
    AnalogBalance,
    // Per-image geometry
    SubfileType,
    OldSubfileType,
    ImageWidth,
    ImageHeight,
    Compression,
    PhotometricInterpretation,
    Orientation,
    SamplesPerPixel,
    XResolution,
    YResolution,
    ResolutionUnit,
    DataOffset,
    DataLength,
    // EXIF sub-IFD
    ExposureTime,
    FNumber,
    FocalLength,
    Iso,
    ExposureProgram,
    DateTimeOriginal,
    DateTimeDigitized,
    SubSecTime,
    SubSecTimeOriginal,
    SubSecTimeDigitized,
    ExifVersion,
    CameraOwnerName,
    BodySerialNumber,
    LensSpecification,
    LensMake,
    LensModel,
    LensSerialNumber,
    ImageTitle,
    Photographer,
    ImageEditor,
    RawDevelopingSoftware,
    ImageEditingSoftware,
    MetadataEditingSoftware,
}

/// One row of the schema.
#[derive(Debug, Clone, Copy)]
pub struct TagDef {
    pub id: u16,
    pub contexts: u16,
    pub wire: DType,
    pub kind: ValueKind,
    pub count: CountRule,
    pub field: Field,
    pub name: &'static str,
}

// Well-known tag IDs the parser and serializer refer to by name.
pub mod tags {
    pub const INTEROP_INDEX: u16 = 0x0001;
    pub const INTEROP_VERSION: u16 = 0x0002;
    pub const MAKERNOTE_ALT: u16 = 0x002e;
    pub const PROCESSING_SOFTWARE: u16 = 0x000b;
    pub const SUBFILE_TYPE: u16 = 0x00fe;
    pub const OLD_SUBFILE_TYPE: u16 = 0x00ff;
    pub const IMAGE_WIDTH: u16 = 0x0100;
    pub const IMAGE_HEIGHT: u16 = 0x0101;
    pub const BITS_PER_SAMPLE: u16 = 0x0102;
    pub const COMPRESSION: u16 = 0x0103;
    pub const PHOTOMETRIC_INTERPRETATION: u16 = 0x0106;
    pub const MAKE: u16 = 0x010f;
    pub const MODEL: u16 = 0x0110;
    pub const ORIENTATION: u16 = 0x0112;
    pub const SAMPLES_PER_PIXEL: u16 = 0x0115;
    pub const X_RESOLUTION: u16 = 0x011a;
    pub const Y_RESOLUTION: u16 = 0x011b;
    pub const RESOLUTION_UNIT: u16 = 0x0128;
    pub const SOFTWARE: u16 = 0x0131;
    pub const DATE_TIME: u16 = 0x0132;
    pub const ARTIST: u16 = 0x013b;
    pub const SUB_IFD_OFFSET: u16 = 0x014a;
    pub const DATA_OFFSET: u16 = 0x0201;
    pub const DATA_LENGTH: u16 = 0x0202;
    pub const COPYRIGHT: u16 = 0x8298;
    pub const EXPOSURE_TIME: u16 = 0x829a;
    pub const F_NUMBER: u16 = 0x829d;
    pub const EXIF_OFFSET: u16 = 0x8769;
    pub const EXPOSURE_PROGRAM: u16 = 0x8822;
    pub const GPS_OFFSET: u16 = 0x8825;
    pub const ISO: u16 = 0x8827;
    pub const EXIF_VERSION: u16 = 0x9000;
    pub const DATE_TIME_ORIGINAL: u16 = 0x9003;
    pub const DATE_TIME_DIGITIZED: u16 = 0x9004;
    pub const APEX_SHUTTER_SPEED: u16 = 0x9201;
    pub const APEX_APERTURE: u16 = 0x9202;
    pub const FOCAL_LENGTH: u16 = 0x920a;
    pub const SUBSEC_TIME: u16 = 0x9290;
    pub const SUBSEC_TIME_ORIGINAL: u16 = 0x9291;
    pub const SUBSEC_TIME_DIGITIZED: u16 = 0x9292;
    pub const MAKERNOTE: u16 = 0x927c;
    pub const INTEROP_OFFSET: u16 = 0xa005;
    pub const CAMERA_OWNER_NAME: u16 = 0xa430;
    pub const BODY_SERIAL_NUMBER: u16 = 0xa431;
    pub const LENS_SPECIFICATION: u16 = 0xa432;
    pub const LENS_MAKE: u16 = 0xa433;
    pub const LENS_MODEL: u16 = 0xa434;
    pub const LENS_SERIAL_NUMBER: u16 = 0xa435;
    pub const IMAGE_TITLE: u16 = 0xa436;
    pub const PHOTOGRAPHER: u16 = 0xa437;
    pub const IMAGE_EDITOR: u16 = 0xa438;
    pub const RAW_DEVELOPING_SOFTWARE: u16 = 0xa43a;
    pub const IMAGE_EDITING_SOFTWARE: u16 = 0xa43b;
    pub const METADATA_EDITING_SOFTWARE: u16 = 0xa43c;
    pub const COLOR_MATRIX_1: u16 = 0xc621;
    pub const COLOR_MATRIX_2: u16 = 0xc622;
    pub const CALIBRATION_MATRIX_1: u16 = 0xc623;
    pub const CALIBRATION_MATRIX_2: u16 = 0xc624;
    pub const REDUCTION_MATRIX_1: u16 = 0xc625;
    pub const REDUCTION_MATRIX_2: u16 = 0xc626;
    pub const ANALOG_BALANCE: u16 = 0xc627;
    pub const AS_SHOT_NEUTRAL: u16 = 0xc628;
    pub const AS_SHOT_WHITE_XY: u16 = 0xc629;
    pub const CALIBRATION_ILLUMINANT_1: u16 = 0xc65a;
    pub const CALIBRATION_ILLUMINANT_2: u16 = 0xc65b;

    // Nikon makernote tags
    pub const NIKON_VERSION: u16 = 0x0001;
    pub const NIKON_LENS_TYPE: u16 = 0x0083;
    pub const NIKON_LENS_SPECIFICATION: u16 = 0x0084;
}

macro_rules! def {
    ($id:expr, $ctx:expr, $wire:ident, $kind:ident, $count:expr, $field:ident, $name:literal) => {
        TagDef {
            id: $id,
            contexts: $ctx,
            wire: DType::$wire,
            kind: ValueKind::$kind,
            count: $count,
            field: Field::$field,
            name: $name,
        }
    };
}

use context::{EXIF, MAKERNOTE, ROOT_THUMB};
use CountRule::{Bounded, Fixed, Scalar, String as CString};

/// The schema table. Lookup is by `(id, context)`; IDs repeat across
/// contexts (Nikon reuses low tag numbers inside makernotes).
pub static SCHEMA: &[TagDef] = &[
    // Root / thumbnail directories
    def!(tags::INTEROP_INDEX, ROOT_THUMB, Ascii, Text, CString, InteropIndex, "InteropIndex"),
    def!(tags::INTEROP_VERSION, ROOT_THUMB, Undefined, Text, CString, InteropVersion, "InteropVersion"),
    def!(tags::PROCESSING_SOFTWARE, ROOT_THUMB, Ascii, Text, CString, ProcessingSoftware, "ProcessingSoftware"),
    def!(tags::SUBFILE_TYPE, ROOT_THUMB, Long, U32, Scalar, SubfileType, "SubfileType"),
    def!(tags::OLD_SUBFILE_TYPE, ROOT_THUMB, Short, U16, Scalar, OldSubfileType, "OldSubfileType"),
    def!(tags::IMAGE_WIDTH, ROOT_THUMB, Long, U32, Scalar, ImageWidth, "ImageWidth"),
    def!(tags::IMAGE_HEIGHT, ROOT_THUMB, Long, U32, Scalar, ImageHeight, "ImageHeight"),
    def!(tags::BITS_PER_SAMPLE, ROOT_THUMB, Long, U32, Bounded(8), BitsPerSample, "BitsPerSample"),
    def!(tags::COMPRESSION, ROOT_THUMB, Short, U16, Scalar, Compression, "Compression"),
    def!(tags::PHOTOMETRIC_INTERPRETATION, ROOT_THUMB, Short, U16, Scalar, PhotometricInterpretation, "PhotometricInterpretation"),
    def!(tags::MAKE, ROOT_THUMB, Ascii, Text, CString, Make, "Make"),
    def!(tags::MODEL, ROOT_THUMB, Ascii, Text, CString, Model, "Model"),
    def!(tags::ORIENTATION, ROOT_THUMB, Short, Enum16, Scalar, Orientation, "Orientation"),
    def!(tags::SAMPLES_PER_PIXEL, ROOT_THUMB, Short, U16, Scalar, SamplesPerPixel, "SamplesPerPixel"),
    def!(tags::X_RESOLUTION, ROOT_THUMB, Rational, URational, Scalar, XResolution, "XResolution"),
    def!(tags::Y_RESOLUTION, ROOT_THUMB, Rational, URational, Scalar, YResolution, "YResolution"),
    def!(tags::RESOLUTION_UNIT, ROOT_THUMB, Short, U16, Scalar, ResolutionUnit, "ResolutionUnit"),
    def!(tags::SOFTWARE, ROOT_THUMB, Ascii, Text, CString, Software, "Software"),
    def!(tags::DATE_TIME, ROOT_THUMB, Ascii, DateTime, CString, DateTime, "DateTime"),
    def!(tags::ARTIST, ROOT_THUMB, Ascii, Text, CString, Artist, "Artist"),
    def!(tags::DATA_OFFSET, ROOT_THUMB, Long, U32, Scalar, DataOffset, "DataOffset"),
    def!(tags::DATA_LENGTH, ROOT_THUMB, Long, U32, Scalar, DataLength, "DataLength"),
    def!(tags::COPYRIGHT, ROOT_THUMB, Ascii, Text, CString, Copyright, "Copyright"),
    def!(tags::APEX_SHUTTER_SPEED, ROOT_THUMB | EXIF, SRational, SRational, Scalar, ApexShutterSpeed, "ShutterSpeedValue"),
    def!(tags::APEX_APERTURE, ROOT_THUMB | EXIF, Rational, URational, Scalar, ApexAperture, "ApertureValue"),
    def!(tags::COLOR_MATRIX_1, ROOT_THUMB, SRational, SRational, Bounded(12), ColorMatrix1, "ColorMatrix1"),
    def!(tags::COLOR_MATRIX_2, ROOT_THUMB, SRational, SRational, Bounded(12), ColorMatrix2, "ColorMatrix2"),
    def!(tags::CALIBRATION_MATRIX_1, ROOT_THUMB, SRational, SRational, Bounded(12), CalibrationMatrix1, "CameraCalibration1"),
    def!(tags::CALIBRATION_MATRIX_2, ROOT_THUMB, SRational, SRational, Bounded(12), CalibrationMatrix2, "CameraCalibration2"),
    def!(tags::REDUCTION_MATRIX_1, ROOT_THUMB, SRational, SRational, Bounded(12), ReductionMatrix1, "ReductionMatrix1"),
    def!(tags::REDUCTION_MATRIX_2, ROOT_THUMB, SRational, SRational, Bounded(12), ReductionMatrix2, "ReductionMatrix2"),
    def!(tags::ANALOG_BALANCE, ROOT_THUMB, Rational, URational, Bounded(4), AnalogBalance, "AnalogBalance"),
    def!(tags::AS_SHOT_NEUTRAL, ROOT_THUMB, Rational, URational, Bounded(4), AsShotNeutral, "AsShotNeutral"),
    def!(tags::AS_SHOT_WHITE_XY, ROOT_THUMB, Rational, URational, Fixed(2), AsShotWhiteXy, "AsShotWhiteXY"),
    def!(tags::CALIBRATION_ILLUMINANT_1, ROOT_THUMB, Short, Enum16, Scalar, CalibrationIlluminant1, "CalibrationIlluminant1"),
    def!(tags::CALIBRATION_ILLUMINANT_2, ROOT_THUMB, Short, Enum16, Scalar, CalibrationIlluminant2, "CalibrationIlluminant2"),
    // EXIF sub-IFD
    def!(tags::EXPOSURE_TIME, EXIF, Rational, URational, Scalar, ExposureTime, "ExposureTime"),
    def!(tags::F_NUMBER, EXIF, Rational, URational, Scalar, FNumber, "FNumber"),
    def!(tags::EXPOSURE_PROGRAM, EXIF, Short, U16, Scalar, ExposureProgram, "ExposureProgram"),
    def!(tags::ISO, EXIF, Short, U16, Scalar, Iso, "ISOSpeedRatings"),
    def!(tags::EXIF_VERSION, EXIF, Undefined, Text, CString, ExifVersion, "ExifVersion"),
    def!(tags::DATE_TIME_ORIGINAL, EXIF, Ascii, DateTime, CString, DateTimeOriginal, "DateTimeOriginal"),
    def!(tags::DATE_TIME_DIGITIZED, EXIF, Ascii, DateTime, CString, DateTimeDigitized, "DateTimeDigitized"),
    // Focal length legitimately appears in both root and EXIF directories;
    // last write wins.
    def!(tags::FOCAL_LENGTH, ROOT_THUMB | EXIF, Rational, URational, Scalar, FocalLength, "FocalLength"),
    def!(tags::SUBSEC_TIME, ROOT_THUMB | EXIF, Ascii, SubSec, CString, SubSecTime, "SubSecTime"),
    def!(tags::SUBSEC_TIME_ORIGINAL, EXIF, Ascii, SubSec, CString, SubSecTimeOriginal, "SubSecTimeOriginal"),
    def!(tags::SUBSEC_TIME_DIGITIZED, EXIF, Ascii, SubSec, CString, SubSecTimeDigitized, "SubSecTimeDigitized"),
    def!(tags::CAMERA_OWNER_NAME, EXIF, Ascii, Text, CString, CameraOwnerName, "CameraOwnerName"),
    def!(tags::BODY_SERIAL_NUMBER, EXIF, Ascii, Text, CString, BodySerialNumber, "BodySerialNumber"),
    def!(tags::LENS_SPECIFICATION, EXIF, Rational, URational, Fixed(4), LensSpecification, "LensSpecification"),
    def!(tags::LENS_MAKE, EXIF, Ascii, Text, CString, LensMake, "LensMake"),
    def!(tags::LENS_MODEL, EXIF, Ascii, Text, CString, LensModel, "LensModel"),
    def!(tags::LENS_SERIAL_NUMBER, EXIF, Ascii, Text, CString, LensSerialNumber, "LensSerialNumber"),
    def!(tags::IMAGE_TITLE, EXIF, Ascii, Text, CString, ImageTitle, "ImageTitle"),
    def!(tags::PHOTOGRAPHER, EXIF, Ascii, Text, CString, Photographer, "Photographer"),
    def!(tags::IMAGE_EDITOR, EXIF, Ascii, Text, CString, ImageEditor, "ImageEditor"),
    def!(tags::RAW_DEVELOPING_SOFTWARE, EXIF, Ascii, Text, CString, RawDevelopingSoftware, "RAWDevelopingSoftware"),
    def!(tags::IMAGE_EDITING_SOFTWARE, EXIF, Ascii, Text, CString, ImageEditingSoftware, "ImageEditingSoftware"),
    def!(tags::METADATA_EDITING_SOFTWARE, EXIF, Ascii, Text, CString, MetadataEditingSoftware, "MetadataEditingSoftware"),
    // Nikon makernote
    def!(tags::NIKON_LENS_SPECIFICATION, MAKERNOTE, Rational, URational, Fixed(4), LensSpecification, "Nikon.LensSpecification"),
];

/// Look up the schema row for a tag in a directory context. Returns `None`
/// for unknown tags, which the parser silently skips.
pub fn find(id: u16, ctx: u16) -> Option<&'static TagDef> {
    SCHEMA
        .iter()
        .find(|def| def.id == id && (def.contexts & ctx) != 0)
}

/// Exact on-wire/decoded pairing.
pub fn matches(kind: ValueKind, wire: DType) -> bool {
    match kind {
        ValueKind::U16 | ValueKind::Enum16 => wire == DType::Short,
        ValueKind::U32 => wire == DType::Long,
        ValueKind::URational => wire == DType::Rational,
        ValueKind::SRational => wire == DType::SRational,
        ValueKind::Text => wire == DType::Ascii || wire == DType::Undefined,
        ValueKind::DateTime | ValueKind::SubSec => wire == DType::Ascii,
    }
}

/// A wider on-wire type that is still representable in the decoded type.
/// ASCII never fits a non-string destination.
pub fn fits(kind: ValueKind, wire: DType) -> bool {
    use DType::*;
    if wire == Ascii {
        return false;
    }
    match kind {
        ValueKind::U16 | ValueKind::Enum16 => {
            matches!(wire, Byte | Undefined | SByte | Short | SShort)
        }
        ValueKind::U32 => matches!(wire, Byte | Undefined | SByte | Short | SShort | Long | SLong),
        ValueKind::Text => wire == Undefined,
        ValueKind::URational | ValueKind::SRational | ValueKind::DateTime | ValueKind::SubSec => {
            false
        }
    }
}
