//! Shared helpers for building synthetic TIFF streams in tests.
//!
//! The builder lays out a header, a list of directories with their
//! out-of-line payloads, and resolves directory offsets so tests can link
//! chains and sub-IFD pointers without hand-computing positions.

#![allow(dead_code)]

/// Payload of a test entry.
pub enum EntryData {
    /// Four inline bytes, already in stream order
    Inline([u8; 4]),
    /// Out-of-line payload placed after the directory
    External(Vec<u8>),
    /// Pointer to another directory in the same build (by index)
    SubIfd(usize),
    /// Arbitrary absolute offset (for malformed-input tests)
    AbsOffset(u32),
}

pub struct TestEntry {
    pub tag: u16,
    pub dtype: u16,
    pub count: u32,
    pub data: EntryData,
}

pub struct TestIfd {
    pub entries: Vec<TestEntry>,
    /// Index of the next directory in this chain, or None to terminate
    pub next: Option<usize>,
}

impl TestIfd {
    pub fn new(entries: Vec<TestEntry>) -> Self {
        Self {
            entries,
            next: None,
        }
    }

    pub fn chained(entries: Vec<TestEntry>, next: usize) -> Self {
        Self {
            entries,
            next: Some(next),
        }
    }
}

fn u16b(le: bool, v: u16) -> [u8; 2] {
    if le {
        v.to_le_bytes()
    } else {
        v.to_be_bytes()
    }
}

fn u32b(le: bool, v: u32) -> [u8; 4] {
    if le {
        v.to_le_bytes()
    } else {
        v.to_be_bytes()
    }
}

fn ifd_size(ifd: &TestIfd) -> u32 {
    let mut size = 2 + 12 * ifd.entries.len() as u32 + 4;
    for e in &ifd.entries {
        if let EntryData::External(b) = &e.data {
            size += b.len() as u32;
        }
    }
    size
}

/// Compute each directory's absolute offset and the total stream length.
pub fn layout(ifds: &[TestIfd]) -> (Vec<u32>, u32) {
    let mut offsets = Vec::new();
    let mut pos = 8u32;
    for ifd in ifds {
        offsets.push(pos);
        pos += ifd_size(ifd);
    }
    (offsets, pos)
}

/// Serialize the directories into a complete TIFF stream. The first
/// directory is the root.
pub fn build_tiff(le: bool, ifds: &[TestIfd]) -> Vec<u8> {
    let (offsets, _) = layout(ifds);
    let mut out = Vec::new();
    if le {
        out.extend_from_slice(b"II");
    } else {
        out.extend_from_slice(b"MM");
    }
    out.extend_from_slice(&u16b(le, 42));
    out.extend_from_slice(&u32b(le, 8));

    for (i, ifd) in ifds.iter().enumerate() {
        let ext_start = offsets[i] + 2 + 12 * ifd.entries.len() as u32 + 4;
        out.extend_from_slice(&u16b(le, ifd.entries.len() as u16));
        let mut ext_acc = 0u32;
        let mut externals: Vec<&[u8]> = Vec::new();
        for e in &ifd.entries {
            out.extend_from_slice(&u16b(le, e.tag));
            out.extend_from_slice(&u16b(le, e.dtype));
            out.extend_from_slice(&u32b(le, e.count));
            match &e.data {
                EntryData::Inline(b) => out.extend_from_slice(b),
                EntryData::External(b) => {
                    out.extend_from_slice(&u32b(le, ext_start + ext_acc));
                    ext_acc += b.len() as u32;
                    externals.push(b);
                }
                EntryData::SubIfd(j) => out.extend_from_slice(&u32b(le, offsets[*j])),
                EntryData::AbsOffset(o) => out.extend_from_slice(&u32b(le, *o)),
            }
        }
        let next = match ifd.next {
            Some(j) => offsets[j],
            None => 0,
        };
        out.extend_from_slice(&u32b(le, next));
        for b in externals {
            out.extend_from_slice(b);
        }
    }
    out
}

pub fn short_entry(le: bool, tag: u16, value: u16) -> TestEntry {
    let b = u16b(le, value);
    TestEntry {
        tag,
        dtype: 3,
        count: 1,
        data: EntryData::Inline([b[0], b[1], 0, 0]),
    }
}

pub fn long_entry(le: bool, tag: u16, value: u32) -> TestEntry {
    TestEntry {
        tag,
        dtype: 4,
        count: 1,
        data: EntryData::Inline(u32b(le, value)),
    }
}

/// ASCII entry; the NUL terminator is included in the count. Strings of at
/// most four bytes (terminator included) are stored inline.
pub fn ascii_entry(tag: u16, text: &str) -> TestEntry {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    let count = bytes.len() as u32;
    let data = if bytes.len() <= 4 {
        let mut inline = [0u8; 4];
        inline[..bytes.len()].copy_from_slice(&bytes);
        EntryData::Inline(inline)
    } else {
        EntryData::External(bytes)
    };
    TestEntry {
        tag,
        dtype: 2,
        count,
        data,
    }
}

pub fn urational_entry(le: bool, tag: u16, pairs: &[(u32, u32)]) -> TestEntry {
    let mut bytes = Vec::with_capacity(pairs.len() * 8);
    for &(num, denom) in pairs {
        bytes.extend_from_slice(&u32b(le, num));
        bytes.extend_from_slice(&u32b(le, denom));
    }
    TestEntry {
        tag,
        dtype: 5,
        count: pairs.len() as u32,
        data: EntryData::External(bytes),
    }
}

pub fn srational_entry(le: bool, tag: u16, pairs: &[(i32, i32)]) -> TestEntry {
    let mut bytes = Vec::with_capacity(pairs.len() * 8);
    for &(num, denom) in pairs {
        bytes.extend_from_slice(&u32b(le, num as u32));
        bytes.extend_from_slice(&u32b(le, denom as u32));
    }
    TestEntry {
        tag,
        dtype: 10,
        count: pairs.len() as u32,
        data: EntryData::External(bytes),
    }
}

/// Wrap a TIFF stream into a minimal JPEG: SOI, APP1 with Exif header, EOI.
pub fn wrap_jpeg(tiff: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let length = 2 + 6 + tiff.len();
    out.extend_from_slice(&(length as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}
