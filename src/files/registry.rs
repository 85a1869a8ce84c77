//! Container handler registry
//!
//! Enum dispatch over the supported container handlers, with detection by
//! magic bytes or file extension. Detection order matters: the TIFF sniffer
//! runs before CIFF because CRW files also open with an "II" byte-order mark.

use crate::core::error::ExifResult;
use crate::files::formats::ciff::CiffHandler;
use crate::files::formats::jpeg::JpegHandler;
use crate::files::formats::mrw::MrwHandler;
use crate::files::formats::raf::RafHandler;
use crate::files::formats::scan::FovbHandler;
use crate::files::formats::tiff::TiffHandler;
use crate::files::handler::{ContainerHandler, ReadContext};

/// Enum of supported container handlers
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub enum Handler {
    Tiff(TiffHandler),
    Jpeg(JpegHandler),
    Raf(RafHandler),
    Mrw(MrwHandler),
    Ciff(CiffHandler),
    Fovb(FovbHandler),
}

impl ContainerHandler for Handler {
    fn can_handle(&self, buf: &[u8]) -> bool {
        match self {
            Handler::Tiff(h) => h.can_handle(buf),
            Handler::Jpeg(h) => h.can_handle(buf),
            Handler::Raf(h) => h.can_handle(buf),
            Handler::Mrw(h) => h.can_handle(buf),
            Handler::Ciff(h) => h.can_handle(buf),
            Handler::Fovb(h) => h.can_handle(buf),
        }
    }

    fn read_metadata(&self, buf: &[u8], ctx: &mut ReadContext<'_>) -> ExifResult<()> {
        match self {
            Handler::Tiff(h) => h.read_metadata(buf, ctx),
            Handler::Jpeg(h) => h.read_metadata(buf, ctx),
            Handler::Raf(h) => h.read_metadata(buf, ctx),
            Handler::Mrw(h) => h.read_metadata(buf, ctx),
            Handler::Ciff(h) => h.read_metadata(buf, ctx),
            Handler::Fovb(h) => h.read_metadata(buf, ctx),
        }
    }

    fn format_name(&self) -> &'static str {
        match self {
            Handler::Tiff(h) => h.format_name(),
            Handler::Jpeg(h) => h.format_name(),
            Handler::Raf(h) => h.format_name(),
            Handler::Mrw(h) => h.format_name(),
            Handler::Ciff(h) => h.format_name(),
            Handler::Fovb(h) => h.format_name(),
        }
    }

    fn extensions(&self) -> &'static [&'static str] {
        match self {
            Handler::Tiff(h) => h.extensions(),
            Handler::Jpeg(h) => h.extensions(),
            Handler::Raf(h) => h.extensions(),
            Handler::Mrw(h) => h.extensions(),
            Handler::Ciff(h) => h.extensions(),
            Handler::Fovb(h) => h.extensions(),
        }
    }
}

/// Registry of container handlers in detection order.
pub struct HandlerRegistry {
    handlers: Vec<Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: vec![
                Handler::Tiff(TiffHandler),
                Handler::Jpeg(JpegHandler),
                Handler::Raf(RafHandler),
                Handler::Mrw(MrwHandler),
                Handler::Ciff(CiffHandler),
                Handler::Fovb(FovbHandler),
            ],
        }
    }

    /// Find a handler by sniffing magic bytes.
    pub fn find_by_detection(&self, buf: &[u8]) -> Option<&Handler> {
        self.handlers.iter().find(|h| h.can_handle(buf))
    }

    /// Find a handler by file extension (case-insensitive).
    pub fn find_by_extension(&self, extension: &str) -> Option<&Handler> {
        let ext = extension.to_lowercase();
        self.handlers
            .iter()
            .find(|h| h.extensions().contains(&ext.as_str()))
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection() {
        let registry = HandlerRegistry::new();
        let tiff = [0x49, 0x49, 0x2A, 0x00, 0, 0, 0, 0];
        assert_eq!(
            registry.find_by_detection(&tiff).unwrap().format_name(),
            "TIFF"
        );
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(
            registry.find_by_detection(&jpeg).unwrap().format_name(),
            "JPEG"
        );
        assert!(registry.find_by_detection(&[0u8; 16]).is_none());
    }

    #[test]
    fn test_ciff_detected_despite_ii_prefix() {
        let mut crw = vec![0x49, 0x49, 0x1A, 0x00, 0x00, 0x00];
        crw.extend_from_slice(b"HEAPCCDR");
        let registry = HandlerRegistry::new();
        assert_eq!(
            registry.find_by_detection(&crw).unwrap().format_name(),
            "CIFF"
        );
    }

    #[test]
    fn test_find_by_extension() {
        let registry = HandlerRegistry::new();
        assert_eq!(
            registry.find_by_extension("JPG").unwrap().format_name(),
            "JPEG"
        );
        assert_eq!(
            registry.find_by_extension("dng").unwrap().format_name(),
            "TIFF"
        );
        assert!(registry.find_by_extension("png").is_none());
    }
}
