//! Value types for EXIF metadata
//!
//! The building blocks of the metadata record: rationals, timestamps, the
//! tag wrapper with provenance, bounded arrays, the string arena, and the
//! calibration illuminant table.

pub mod arena;
pub mod datetime;
pub mod illuminant;
pub mod rational;
pub mod tag;

pub use arena::{StrRef, StringArena, ARENA_CAPACITY};
pub use datetime::{subsec_millis, DateTime};
pub use illuminant::Illuminant;
pub use rational::{Rational, SRational, URational, RATIONAL_ACCURACY};
pub use tag::{Tag, Vla};
