//! E2E tests: write .dat and calibration files to disk, unpack them back.

use std::fs;
use std::io::Write;
use std::path::Path;

use linospad::utils::{read_calibration_csv, write_matrix};
use linospad::{CalibrationDir, CalibrationSource, DatFile, Timestamp, UnpackError, unpack_reader};

const PIXELS: usize = 256;
const BINS: usize = 140;

fn write_dat(dir: &Path, name: &str, words: &[u32]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).unwrap();
    for w in words {
        file.write_all(&w.to_le_bytes()).unwrap();
    }
    path
}

/// Calibration CSV with a pixel index column; offset = bin * 17.9 + pixel / 10
fn write_calibration(dir: &Path, board: &str) {
    let mut text = String::from("pixel");
    for bin in 0..BINS {
        text.push_str(&format!(",{bin}"));
    }
    text.push('\n');
    for pixel in 0..PIXELS {
        text.push_str(&pixel.to_string());
        for bin in 0..BINS {
            text.push_str(&format!(",{}", calibration_value(pixel, bin)));
        }
        text.push('\n');
    }
    fs::write(dir.join(format!("TDC_{board}.csv")), text).unwrap();
}

fn calibration_value(pixel: usize, bin: usize) -> f64 {
    (bin * 179 + pixel) as f64 / 10.0
}

/// Two cycles of 4 slots with a few hits at known positions
fn acquisition() -> Vec<u32> {
    let t = 4;
    let mut words = vec![0u32; t * PIXELS * 2];
    // cycle 0, pixel 0, slot 0
    words[0] = 0x8000_0000 | 1;
    // cycle 0, pixel 17, slot 2
    words[17 * t + 2] = 0x8000_0000 | (140 * 3 + 10);
    // cycle 1, pixel 255, slot 3
    words[(255 + PIXELS) * t + 3] = 0x8000_0000 | 139;
    words
}

#[test]
fn unpack_file_without_calibration() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dat(dir.path(), "data.dat", &acquisition());

    let dat = DatFile::open(&path).unwrap();
    let m = dat.unpack(4).unwrap();
    assert_eq!((m.pixels(), m.columns(), m.cycles()), (256, 8, 2));
    assert_eq!(m.get(0, 0), Some(Timestamp::Valid(17.857)));
    assert_eq!(m.get(17, 2), Some(Timestamp::Valid(430.0 * 17.857)));
    assert_eq!(m.get(255, 7), Some(Timestamp::Valid(139.0 * 17.857)));
    assert_eq!(m.valid_count(), 3);

    let from_reader = unpack_reader(fs::File::open(&path).unwrap(), 4).unwrap();
    assert_eq!(from_reader, m);
}

#[test]
fn unpack_file_with_calibration_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dat(dir.path(), "data.dat", &acquisition());
    let calib_dir = dir.path().join("calibration_data");
    fs::create_dir(&calib_dir).unwrap();
    write_calibration(&calib_dir, "A5");

    let dat = DatFile::open(&path).unwrap();
    let source = CalibrationDir::new(&calib_dir);
    let m = dat.unpack_with_source(4, &source, "A5").unwrap();

    assert_eq!(m.get(0, 0), Some(Timestamp::Valid(calibration_value(0, 1))));
    assert_eq!(
        m.get(17, 2),
        Some(Timestamp::Valid(420.0 * 17.857 + calibration_value(17, 10)))
    );
    assert_eq!(
        m.get(255, 7),
        Some(Timestamp::Valid(calibration_value(255, 139)))
    );
    assert_eq!(m.invalid_count(), 256 * 8 - 3);

    let table = source.load("A5").unwrap();
    assert_eq!(table, read_calibration_csv(calib_dir.join("TDC_A5.csv")).unwrap());
}

#[test]
fn missing_calibration_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dat(dir.path(), "data.dat", &acquisition());
    write_calibration(dir.path(), "A5");

    let dat = DatFile::open(&path).unwrap();
    let err = dat
        .unpack_with_source(4, &CalibrationDir::new(dir.path()), "NL11")
        .unwrap_err();
    match err {
        UnpackError::CalibrationUnavailable { board, location } => {
            assert_eq!(board, "NL11");
            assert_eq!(location, dir.path());
        }
        other => panic!("expected CalibrationUnavailable, got {other:?}"),
    }
}

#[test]
fn truncated_file_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dat(dir.path(), "data.dat", &acquisition());
    let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&[0x12, 0x34, 0x56]).unwrap();
    drop(file);

    let dat = DatFile::open(&path).unwrap();
    assert!(matches!(
        dat.unpack(4),
        Err(UnpackError::Format { trailing: 3, .. })
    ));
    assert!(matches!(dat.stats(), Err(UnpackError::Format { .. })));
}

#[test]
fn export_roundtrip_through_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dat(dir.path(), "data.dat", &acquisition());
    let m = DatFile::open(&path).unwrap().unpack(4).unwrap();

    let out = dir.path().join("matrix.csv");
    write_matrix(&out, &m, true).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("pixel_000,pixel_001"));
    assert_eq!(header.split(',').count(), 256);
    assert_eq!(lines.count(), 8);
}
