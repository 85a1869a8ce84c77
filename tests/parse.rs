//! Parsing behavior on synthetic TIFF streams: boundary cases, directory
//! chains, sub-IFDs, and the strict/lenient split.

mod common;

use common::*;
use exifkit::core::tags;
use exifkit::{read_bytes, read_bytes_with, ExifError, ReadOptions, SubfileKind};

#[test]
fn minimal_tiff_parses_clean() {
    // Header + one directory with zero entries
    let buf = build_tiff(true, &[TestIfd::new(vec![])]);
    let parsed = read_bytes(&buf).unwrap();
    assert_eq!(parsed.data.num_images(), 1);
    assert!(parsed.warnings.is_empty());
    assert!(!parsed.data.make.is_set());
    assert!(!parsed.data.exif.exposure_time.is_set());
}

#[test]
fn string_inline_and_out_of_line() {
    // "abc" occupies exactly four bytes with its terminator (inline);
    // "abcd" takes five and must go out-of-line.
    let root = TestIfd::new(vec![
        ascii_entry(tags::MAKE, "abc"),
        ascii_entry(tags::MODEL, "abcd"),
    ]);
    let buf = build_tiff(true, &[root]);
    let parsed = read_bytes(&buf).unwrap();
    let data = &parsed.data;
    assert_eq!(data.tag_text(&data.make).unwrap(), "abc");
    assert_eq!(data.tag_text(&data.model).unwrap(), "abcd");
    assert!(parsed.warnings.is_empty());
}

#[test]
fn zero_count_entry_is_ignored() {
    let root = TestIfd::new(vec![TestEntry {
        tag: tags::MAKE,
        dtype: 2,
        count: 0,
        data: EntryData::Inline([0; 4]),
    }]);
    let buf = build_tiff(true, &[root]);
    let parsed = read_bytes(&buf).unwrap();
    assert!(!parsed.data.make.is_set());
    assert!(parsed.warnings.is_empty());
}

#[test]
fn rational_with_zero_denominator_decodes() {
    let root = TestIfd::new(vec![urational_entry(true, tags::X_RESOLUTION, &[(72, 0)])]);
    let buf = build_tiff(true, &[root]);
    let parsed = read_bytes(&buf).unwrap();
    let r = parsed.data.images()[0].x_resolution.get().copied().unwrap();
    assert_eq!((r.num, r.denom), (72, 0));
    assert!(r.to_f64().is_infinite());
}

#[test]
fn endian_robustness() {
    for le in [true, false] {
        let root = TestIfd::new(vec![
            ascii_entry(tags::MAKE, "TestCam"),
            long_entry(le, tags::IMAGE_WIDTH, 6016),
            long_entry(le, tags::IMAGE_HEIGHT, 4016),
            short_entry(le, tags::ORIENTATION, 6),
            urational_entry(le, tags::X_RESOLUTION, &[(300, 1)]),
        ]);
        let buf = build_tiff(le, &[root]);
        let parsed = read_bytes(&buf).unwrap();
        let data = &parsed.data;
        assert_eq!(data.tag_text(&data.make).unwrap(), "TestCam", "le={le}");
        let img = &data.images()[0];
        assert_eq!(img.image_width.get(), Some(&6016));
        assert_eq!(img.image_height.get(), Some(&4016));
        assert_eq!(
            img.orientation.get().copied(),
            Some(exifkit::Orientation::Rotate90Cw)
        );
        assert_eq!(img.x_resolution.get().copied().unwrap().to_f64(), 300.0);
        assert!(parsed.warnings.is_empty(), "le={le}");
    }
}

#[test]
fn malicious_offset_lenient_warns_strict_fails() {
    let root = TestIfd::new(vec![TestEntry {
        tag: tags::X_RESOLUTION,
        dtype: 5,
        count: 100,
        data: EntryData::AbsOffset(0), // patched below
    }]);
    let (_, total) = layout(std::slice::from_ref(&root));
    let root = TestIfd::new(vec![TestEntry {
        tag: tags::X_RESOLUTION,
        dtype: 5,
        count: 100,
        data: EntryData::AbsOffset(total - 4),
    }]);
    let buf = build_tiff(true, &[root]);

    let parsed = read_bytes(&buf).unwrap();
    assert!(!parsed.data.images()[0].x_resolution.is_set());
    assert!(!parsed.warnings.is_empty());

    let res = read_bytes_with(&buf, ReadOptions::default().strict());
    assert!(matches!(res, Err(ExifError::CorruptData(_))));
}

#[test]
fn directory_chain_of_five_parses_fully() {
    let ifds: Vec<TestIfd> = (0..5)
        .map(|i| {
            let entries = vec![long_entry(true, tags::IMAGE_WIDTH, 1000 + i)];
            if i < 4 {
                TestIfd::chained(entries, i as usize + 1)
            } else {
                TestIfd::new(entries)
            }
        })
        .collect();
    let buf = build_tiff(true, &ifds);
    let parsed = read_bytes(&buf).unwrap();
    assert_eq!(parsed.data.num_images(), 5);
    assert!(parsed.warnings.is_empty());
    for (i, img) in parsed.data.images().iter().enumerate() {
        assert_eq!(img.image_width.get(), Some(&(1000 + i as u32)));
    }
}

#[test]
fn directory_chain_of_six_truncates_with_warning() {
    let ifds: Vec<TestIfd> = (0..6)
        .map(|i| {
            let entries = vec![long_entry(true, tags::IMAGE_WIDTH, 1000 + i)];
            if i < 5 {
                TestIfd::chained(entries, i as usize + 1)
            } else {
                TestIfd::new(entries)
            }
        })
        .collect();
    let buf = build_tiff(true, &ifds);
    let parsed = read_bytes(&buf).unwrap();
    assert_eq!(parsed.data.num_images(), 5);
    assert!(parsed
        .warnings
        .iter()
        .any(|w| w.message.contains("chain too long")));
}

#[test]
fn sub_ifd_chain_assigns_image_roles() {
    // Root points at a chain of two sub-directories: one full-resolution,
    // one reduced.
    let root = TestIfd::new(vec![TestEntry {
        tag: tags::SUB_IFD_OFFSET,
        dtype: 4,
        count: 1,
        data: EntryData::SubIfd(1),
    }]);
    let full = TestIfd::chained(
        vec![
            long_entry(true, tags::SUBFILE_TYPE, 0),
            long_entry(true, tags::IMAGE_WIDTH, 6016),
        ],
        2,
    );
    let reduced = TestIfd::new(vec![
        long_entry(true, tags::SUBFILE_TYPE, 1),
        long_entry(true, tags::IMAGE_WIDTH, 1600),
    ]);
    let buf = build_tiff(true, &[root, full, reduced]);
    let parsed = read_bytes(&buf).unwrap();
    let data = &parsed.data;

    assert_eq!(data.num_images(), 3);
    let kinds: Vec<SubfileKind> = data.images().iter().map(|img| img.kind).collect();
    assert_eq!(kinds[0], SubfileKind::None);
    assert!(kinds.contains(&SubfileKind::FullResolution));
    assert!(kinds.contains(&SubfileKind::ReducedResolution));

    let full_img = data.full_resolution_image().unwrap();
    assert_eq!(full_img.image_width.get(), Some(&6016));
}

#[test]
fn exif_sub_ifd_decodes_in_exif_context() {
    let root = TestIfd::new(vec![
        ascii_entry(tags::MAKE, "Nikon"),
        TestEntry {
            tag: tags::EXIF_OFFSET,
            dtype: 4,
            count: 1,
            data: EntryData::SubIfd(1),
        },
    ]);
    let exif = TestIfd::new(vec![
        urational_entry(true, tags::EXPOSURE_TIME, &[(1, 400)]),
        short_entry(true, tags::ISO, 1600),
    ]);
    let buf = build_tiff(true, &[root, exif]);
    let parsed = read_bytes(&buf).unwrap();
    let data = &parsed.data;
    assert_eq!(
        data.exif.exposure_time.get().copied().unwrap().to_f64(),
        0.0025
    );
    assert_eq!(data.exif.iso.get(), Some(&1600));
    // Only the root directory claims an image slot
    assert_eq!(data.num_images(), 1);
}

#[test]
fn last_write_wins_across_directories() {
    // Focal length appears in the root directory and again in the EXIF
    // sub-IFD; the sub-IFD drains after the root chain, so it wins.
    let root = TestIfd::new(vec![
        urational_entry(true, tags::FOCAL_LENGTH, &[(35, 1)]),
        TestEntry {
            tag: tags::EXIF_OFFSET,
            dtype: 4,
            count: 1,
            data: EntryData::SubIfd(1),
        },
    ]);
    let exif = TestIfd::new(vec![urational_entry(true, tags::FOCAL_LENGTH, &[(50, 1)])]);
    let buf = build_tiff(true, &[root, exif]);
    let parsed = read_bytes(&buf).unwrap();
    let focal = parsed.data.exif.focal_length.get().copied().unwrap();
    assert_eq!(focal.to_f64(), 50.0);
    assert_eq!(parsed.data.exif.focal_length.parsed_from(), tags::FOCAL_LENGTH);
}

#[test]
fn unknown_tags_are_skipped_silently() {
    let root = TestIfd::new(vec![
        TestEntry {
            tag: 0xBEEF,
            dtype: 3,
            count: 1,
            data: EntryData::Inline([1, 0, 0, 0]),
        },
        ascii_entry(tags::MAKE, "Nikon"),
    ]);
    let buf = build_tiff(true, &[root]);
    let parsed = read_bytes(&buf).unwrap();
    assert!(parsed.warnings.is_empty());
    assert_eq!(parsed.data.tag_text(&parsed.data.make).unwrap(), "Nikon");
}

#[test]
fn short_stored_as_byte_fits_with_warning() {
    // ISO stored as BYTE where SHORT is expected: decodes, but warns.
    let root = TestIfd::new(vec![
        TestEntry {
            tag: tags::EXIF_OFFSET,
            dtype: 4,
            count: 1,
            data: EntryData::SubIfd(1),
        },
    ]);
    let exif = TestIfd::new(vec![TestEntry {
        tag: tags::ISO,
        dtype: 1,
        count: 1,
        data: EntryData::Inline([200, 0, 0, 0]),
    }]);
    let buf = build_tiff(true, &[root, exif]);
    let parsed = read_bytes(&buf).unwrap();
    assert_eq!(parsed.data.exif.iso.get(), Some(&200));
    assert!(parsed.warnings.iter().any(|w| w.message.contains("fits")));
}

#[test]
fn aperture_value_decodes_from_unsigned_rational() {
    // Third-party files encode ApertureValue (0x9202) as unsigned RATIONAL;
    // only ShutterSpeedValue (0x9201) is signed.
    let root = TestIfd::new(vec![
        urational_entry(true, tags::APEX_APERTURE, &[(43, 10)]),
        TestEntry {
            tag: tags::EXIF_OFFSET,
            dtype: 4,
            count: 1,
            data: EntryData::SubIfd(1),
        },
    ]);
    let exif = TestIfd::new(vec![srational_entry(true, tags::APEX_SHUTTER_SPEED, &[(-24, 10)])]);
    let buf = build_tiff(true, &[root, exif]);
    let parsed = read_bytes(&buf).unwrap();
    assert!(parsed.warnings.is_empty());

    let aperture = parsed.data.apex_aperture.get().copied().unwrap();
    assert_eq!((aperture.num, aperture.denom), (43, 10));
    assert_eq!(parsed.data.apex_aperture.parsed_from(), tags::APEX_APERTURE);

    let shutter = parsed.data.apex_shutter_speed.get().copied().unwrap();
    assert_eq!((shutter.num, shutter.denom), (-24, 10));
}

#[test]
fn color_matrices_decode() {
    let pairs: Vec<(i32, i32)> = (0..9).map(|i| (i - 4, 10_000)).collect();
    let root = TestIfd::new(vec![
        srational_entry(true, tags::COLOR_MATRIX_1, &pairs),
        short_entry(true, tags::CALIBRATION_ILLUMINANT_1, 21), // D65
    ]);
    let buf = build_tiff(true, &[root]);
    let parsed = read_bytes(&buf).unwrap();
    let data = &parsed.data;
    let m = data.color_matrix_1.get().unwrap();
    assert_eq!(m.len(), 9);
    assert_eq!(m.as_slice()[0].num, -4);
    assert_eq!(
        data.calibration_illuminant_1.get(),
        Some(&exifkit::Illuminant::D65)
    );
}
