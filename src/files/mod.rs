//! Container format support
//!
//! This module locates metadata inside the supported camera file containers
//! and exposes the high-level read API.

pub mod file;
pub mod formats;
pub mod handler;
pub mod registry;

pub use file::{read_bytes, read_bytes_with, read_file, read_file_with, ParsedExif};
pub use formats::ciff::CiffHandler;
pub use formats::jpeg::JpegHandler;
pub use formats::mrw::MrwHandler;
pub use formats::raf::RafHandler;
pub use formats::scan::FovbHandler;
pub use formats::tiff::TiffHandler;
pub use handler::{ContainerHandler, ReadOptions};
pub use registry::{Handler, HandlerRegistry};
