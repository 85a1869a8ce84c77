//! The typed metadata record
//!
//! [`ExifData`] is the fully decoded output of a parse: per-image attributes
//! for up to five images, shot/lens/authorship fields, DNG color-calibration
//! fields, a nested EXIF sub-record, and the string arena every text field
//! references. The record is self-contained: cloning it clones the arena and
//! every [`StrRef`] stays valid.

use crate::core::error::ExifResult;
use crate::types::{DateTime, Illuminant, SRational, StrRef, StringArena, Tag, URational, Vla};
use std::borrow::Cow;

/// Maximum number of image directories captured per file.
pub const MAX_IMAGES: usize = 5;

/// Detected container format of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileType {
    #[default]
    Tiff,
    Ciff,
    Jpeg,
    Raf,
    Mrw,
    Fovb,
}

impl FileType {
    pub fn name(self) -> &'static str {
        match self {
            FileType::Tiff => "TIFF",
            FileType::Ciff => "CIFF",
            FileType::Jpeg => "JPEG",
            FileType::Raf => "RAF",
            FileType::Mrw => "MRW",
            FileType::Fovb => "FOVb",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Container sub-variant, for TIFF-based raw formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileVariant {
    #[default]
    Standard,
    Orf,
    Rw2,
}

impl std::fmt::Display for FileVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FileVariant::Standard => "Standard",
            FileVariant::Orf => "ORF",
            FileVariant::Rw2 => "RW2",
        })
    }
}

/// TIFF orientation values (tag 0x0112).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u16)]
pub enum Orientation {
    #[default]
    Horizontal = 1,
    MirrorHorizontal = 2,
    Rotate180 = 3,
    MirrorVertical = 4,
    MirrorHorizontalRotate270Cw = 5,
    Rotate90Cw = 6,
    MirrorHorizontalRotate90Cw = 7,
    Rotate270Cw = 8,
}

impl Orientation {
    pub fn from_code(code: u16) -> Option<Self> {
        use Orientation::*;
        Some(match code {
            1 => Horizontal,
            2 => MirrorHorizontal,
            3 => Rotate180,
            4 => MirrorVertical,
            5 => MirrorHorizontalRotate270Cw,
            6 => Rotate90Cw,
            7 => MirrorHorizontalRotate90Cw,
            8 => Rotate270Cw,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        use Orientation::*;
        match self {
            Horizontal => "Horizontal",
            MirrorHorizontal => "Mirror Horizontal",
            Rotate180 => "Rotate 180",
            MirrorVertical => "Mirror Vertical",
            MirrorHorizontalRotate270Cw => "Mirror Horizontal, Rotate 270 CW",
            Rotate90Cw => "Rotate 90 CW",
            MirrorHorizontalRotate90Cw => "Mirror Horizontal, Rotate 90 CW",
            Rotate270Cw => "Rotate 270 CW",
        }
    }
}

/// Role of an image directory within the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubfileKind {
    #[default]
    None,
    FullResolution,
    ReducedResolution,
    Other,
}

/// Per-directory image description.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageData {
    pub kind: SubfileKind,
    pub image_width: Tag<u32>,
    pub image_height: Tag<u32>,
    pub compression: Tag<u16>,
    pub photometric_interpretation: Tag<u16>,
    pub orientation: Tag<Orientation>,
    pub samples_per_pixel: Tag<u16>,
    pub x_resolution: Tag<URational>,
    pub y_resolution: Tag<URational>,
    pub resolution_unit: Tag<u16>,
    pub data_offset: Tag<u32>,
    pub data_length: Tag<u32>,
}

/// The shot record decoded from the EXIF sub-IFD.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifIfd {
    pub exposure_time: Tag<URational>,
    pub f_number: Tag<URational>,
    pub focal_length: Tag<URational>,
    pub iso: Tag<u16>,
    pub exposure_program: Tag<u16>,
    pub date_time_original: Tag<DateTime>,
    pub date_time_digitized: Tag<DateTime>,

    pub exif_version: Tag<StrRef>,

    pub camera_owner_name: Tag<StrRef>,
    pub body_serial_number: Tag<StrRef>,

    /// (MinFocalLen, MaxFocalLen, MinFNum@MinFL, MinFNum@MaxFL)
    pub lens_specification: Tag<[URational; 4]>,
    pub lens_make: Tag<StrRef>,
    pub lens_model: Tag<StrRef>,
    pub lens_serial_number: Tag<StrRef>,

    pub image_title: Tag<StrRef>,
    pub photographer: Tag<StrRef>,
    /// A person, as opposed to the software fields below.
    pub image_editor: Tag<StrRef>,
    pub raw_developing_software: Tag<StrRef>,
    pub image_editing_software: Tag<StrRef>,
    pub metadata_editing_software: Tag<StrRef>,
}

/// The root metadata record returned by a parse.
#[derive(Debug, Clone)]
pub struct ExifData {
    pub file_type: FileType,
    pub variant: FileVariant,

    images: [ImageData; MAX_IMAGES],
    num_images: usize,

    pub copyright: Tag<StrRef>,
    pub artist: Tag<StrRef>,
    pub make: Tag<StrRef>,
    pub model: Tag<StrRef>,
    pub software: Tag<StrRef>,
    pub processing_software: Tag<StrRef>,
    pub date_time: Tag<DateTime>,

    pub color_matrix_1: Tag<Vla<SRational, 12>>,
    pub color_matrix_2: Tag<Vla<SRational, 12>>,
    pub calibration_matrix_1: Tag<Vla<SRational, 12>>,
    pub calibration_matrix_2: Tag<Vla<SRational, 12>>,
    pub reduction_matrix_1: Tag<Vla<SRational, 12>>,
    pub reduction_matrix_2: Tag<Vla<SRational, 12>>,
    pub calibration_illuminant_1: Tag<Illuminant>,
    pub calibration_illuminant_2: Tag<Illuminant>,
    pub as_shot_neutral: Tag<Vla<URational, 4>>,
    pub as_shot_white_xy: Tag<[URational; 2]>,
    pub analog_balance: Tag<Vla<URational, 4>>,

    pub apex_aperture: Tag<SRational>,
    pub apex_shutter_speed: Tag<SRational>,

    pub exif: ExifIfd,

    arena: StringArena,
}

impl ExifData {
    pub fn new() -> Self {
        Self {
            file_type: FileType::default(),
            variant: FileVariant::default(),
            images: [ImageData::default(); MAX_IMAGES],
            num_images: 0,
            copyright: Tag::default(),
            artist: Tag::default(),
            make: Tag::default(),
            model: Tag::default(),
            software: Tag::default(),
            processing_software: Tag::default(),
            date_time: Tag::default(),
            color_matrix_1: Tag::default(),
            color_matrix_2: Tag::default(),
            calibration_matrix_1: Tag::default(),
            calibration_matrix_2: Tag::default(),
            reduction_matrix_1: Tag::default(),
            reduction_matrix_2: Tag::default(),
            calibration_illuminant_1: Tag::default(),
            calibration_illuminant_2: Tag::default(),
            as_shot_neutral: Tag::default(),
            as_shot_white_xy: Tag::default(),
            analog_balance: Tag::default(),
            apex_aperture: Tag::default(),
            apex_shutter_speed: Tag::default(),
            exif: ExifIfd::default(),
            arena: StringArena::new(),
        }
    }

    /// The decoded image directories, primary first.
    pub fn images(&self) -> &[ImageData] {
        &self.images[..self.num_images]
    }

    pub fn num_images(&self) -> usize {
        self.num_images
    }

    /// The first image whose subfile role is full resolution, if any.
    pub fn full_resolution_image(&self) -> Option<&ImageData> {
        self.images()
            .iter()
            .find(|img| img.kind == SubfileKind::FullResolution)
    }

    /// Copy a string into the record's arena and return a reference to it.
    pub fn store_str(&mut self, text: &str) -> ExifResult<StrRef> {
        self.arena.store(text.as_bytes())
    }

    /// Copy raw bytes into the record's arena.
    pub fn store_bytes(&mut self, bytes: &[u8]) -> ExifResult<StrRef> {
        self.arena.store(bytes)
    }

    /// The bytes a string reference points at.
    pub fn bytes(&self, r: StrRef) -> &[u8] {
        self.arena.bytes(r)
    }

    /// The text a string reference points at.
    pub fn text(&self, r: StrRef) -> Cow<'_, str> {
        self.arena.text(r)
    }

    /// The text of a string-valued tag, if set.
    pub fn tag_text(&self, tag: &Tag<StrRef>) -> Option<Cow<'_, str>> {
        tag.get().map(|&r| self.arena.text(r))
    }

    pub fn arena_used(&self) -> usize {
        self.arena.used()
    }

    /// Claim the next image slot, or `None` when all five are taken.
    pub(crate) fn alloc_image(&mut self) -> Option<usize> {
        if self.num_images >= MAX_IMAGES {
            return None;
        }
        let idx = self.num_images;
        self.num_images += 1;
        Some(idx)
    }

    pub(crate) fn image_mut(&mut self, idx: usize) -> &mut ImageData {
        &mut self.images[idx]
    }
}

impl Default for ExifData {
    fn default() -> Self {
        Self::new()
    }
}
