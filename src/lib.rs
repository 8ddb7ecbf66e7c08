//! Unpacking of LinoSPAD2 binary acquisition data.
//!
//! Raw `.dat` streams of 32-bit words are decoded into photon-arrival
//! timestamps and folded into a 256-pixel matrix, optionally corrected with a
//! per-pixel TDC calibration table.

pub mod config;
pub mod dat_file;
pub mod error;
pub mod parser;
pub mod processing;
#[cfg(feature = "python")]
pub mod python;
pub mod types;
pub mod utils;

pub use config::UnpackConfig;
pub use dat_file::DatFile;
pub use error::{UnpackError, UnpackResult};
pub use processing::{
    CalibrationCorrector, StreamStats, unpack, unpack_calibrated, unpack_reader,
    unpack_reader_calibrated,
};
pub use types::{AcquisitionGeometry, CalibrationTable, Packet, Timestamp, TimestampMatrix};
pub use utils::{CalibrationDir, CalibrationSource};

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(words: &[u32]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    #[test]
    fn test_unpack_calibrated_through_source() {
        let mut words = vec![0u32; 256 * 10];
        // pixel 2, cycle 0, slot 3: raw count 2 * 140 + 5
        words[2 * 10 + 3] = 0x8000_0000 | 285;
        let bytes = stream(&words);

        let mut offsets = ndarray::Array2::zeros((256, 140));
        offsets[[2, 5]] = 42.0;
        let source = CalibrationTable::from_array(offsets).unwrap();
        let table = source.load("any-board").unwrap();

        let m = unpack_calibrated(&bytes, 10, &table).unwrap();
        assert_eq!(m.get(2, 3), Some(Timestamp::Valid(280.0 * 17.857 + 42.0)));
        assert_eq!(m.valid_count(), 1);
    }
}
