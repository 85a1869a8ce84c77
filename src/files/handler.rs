//! Container handler trait
//!
//! Each supported container format implements [`ContainerHandler`]: sniff the
//! magic bytes, locate the embedded TIFF metadata stream, and hand it to the
//! directory parser. Handlers work on byte slices because TIFF payload
//! offsets are absolute within their stream.

use crate::core::error::{ExifResult, ParseWarning};
use crate::core::metadata::ExifData;

/// Options controlling how metadata is read.
///
/// Use the builder pattern to configure options:
///
/// ```rust
/// use exifkit::ReadOptions;
///
/// let options = ReadOptions::default().strict();
/// assert!(options.is_strict());
/// ```
#[derive(Default, Clone, Copy, Debug)]
pub struct ReadOptions {
    /// Fail on the first recoverable anomaly instead of recording a warning
    pub(crate) strict: bool,
}

impl ReadOptions {
    /// Fail on the first recoverable anomaly (out-of-range offset, type
    /// mismatch, odd directory alignment, ...).
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Convert recoverable anomalies into warnings and keep parsing
    /// (default).
    pub fn lenient(mut self) -> Self {
        self.strict = false;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

/// Mutable parse state shared with a handler: the record under construction
/// and the warning list.
pub struct ReadContext<'b> {
    pub data: &'b mut ExifData,
    pub warnings: &'b mut Vec<ParseWarning>,
    pub options: ReadOptions,
}

/// Trait implemented by every container format handler.
pub trait ContainerHandler {
    /// Check whether this handler recognizes the file's magic bytes. Must
    /// not allocate and must tolerate arbitrarily short buffers.
    fn can_handle(&self, buf: &[u8]) -> bool;

    /// Locate and parse the embedded metadata.
    fn read_metadata(&self, buf: &[u8], ctx: &mut ReadContext<'_>) -> ExifResult<()>;

    /// Name of the container format (e.g. "TIFF", "JPEG").
    fn format_name(&self) -> &'static str;

    /// File extensions conventionally used by this format.
    fn extensions(&self) -> &'static [&'static str];
}
