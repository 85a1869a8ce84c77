//! Core parsing and serialization machinery
//!
//! The byte cursor, the tag schema, the entry decoder, the directory parser
//! and the TIFF serializer, plus the metadata record they fill in.

pub mod cursor;
pub mod decoder;
pub mod error;
pub mod metadata;
pub mod parser;
pub mod schema;
pub mod serializer;

pub use cursor::{ByteCursor, Endian};
pub use error::{ExifError, ExifResult, ParseWarning};
pub use metadata::{
    ExifData, ExifIfd, FileType, FileVariant, ImageData, Orientation, SubfileKind, MAX_IMAGES,
};
pub use schema::{context, tags, CountRule, DType, Field, TagDef, ValueKind, SCHEMA};
pub use serializer::{write_jpeg_app1, write_tiff};
