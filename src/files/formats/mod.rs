//! Container format handlers
//!
//! One module per supported container. Each locates the embedded TIFF
//! metadata stream its own way; the directory parser does the rest.

pub mod ciff;
pub mod jpeg;
pub mod mrw;
pub mod raf;
pub mod scan;
pub mod tiff;
