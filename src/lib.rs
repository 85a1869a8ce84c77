//! # exifkit
//!
//! Pure Rust reader and writer for photographic metadata embedded in camera
//! image files. Given a byte buffer or a path, the crate recognizes the
//! container format (TIFF and TIFF-based raw formats, JPEG, Fujifilm RAF,
//! Minolta MRW, Sigma FOVb, with Canon CIFF detection), locates the embedded
//! TIFF metadata stream, and decodes its tagged directories into a typed,
//! self-contained [`ExifData`] record. The record can be re-emitted as a
//! standalone TIFF stream or a JPEG APP1 segment.
//!
//! Parsing is lenient by default: recoverable anomalies become
//! [`ParseWarning`] entries on the result instead of failing the call. Pass
//! [`ReadOptions::strict`] to fail on the first anomaly instead.
//!
//! ## Reading
//!
//! ```rust,no_run
//! # fn main() -> Result<(), exifkit::ExifError> {
//! let parsed = exifkit::read_file("photo.nef")?;
//! println!("container: {}", parsed.file_type());
//! if let Some(model) = parsed.data.tag_text(&parsed.data.model) {
//!     println!("camera: {}", model);
//! }
//! for warning in &parsed.warnings {
//!     eprintln!("warning: {}", warning);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Writing
//!
//! ```rust
//! # fn main() -> Result<(), exifkit::ExifError> {
//! use exifkit::{DateTime, ExifData, URational};
//!
//! let mut data = ExifData::new();
//! let make = data.store_str("Nikon")?;
//! data.make.set(make);
//! data.exif.exposure_time.set(URational::new(1, 400));
//! data.date_time.set(DateTime::new(2025, 8, 26, 10, 0, 0));
//!
//! // APP1 segment bytes, ready to insert after a JPEG SOI marker
//! let app1 = exifkit::write_jpeg_app1(&data);
//! assert_eq!(&app1[0..2], &[0xFF, 0xE1]);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod files;
pub mod makernote;
pub mod types;

pub use crate::core::error::{ExifError, ExifResult, ParseWarning};
pub use crate::core::metadata::{
    ExifData, ExifIfd, FileType, FileVariant, ImageData, Orientation, SubfileKind, MAX_IMAGES,
};
pub use crate::core::serializer::{write_jpeg_app1, write_tiff};
pub use crate::files::file::{read_bytes, read_bytes_with, read_file, read_file_with, ParsedExif};
pub use crate::files::handler::ReadOptions;
pub use crate::types::{
    subsec_millis, DateTime, Illuminant, Rational, SRational, StrRef, Tag, URational, Vla,
    ARENA_CAPACITY, RATIONAL_ACCURACY,
};
