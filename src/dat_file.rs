use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::debug;

use crate::error::UnpackResult;
use crate::parser::{packets, word_count};
use crate::processing::{self, StreamStats};
use crate::types::{AcquisitionGeometry, CalibrationTable, Packet, TimestampMatrix};
use crate::utils::CalibrationSource;
use crate::utils::file_utils::read_binary_file_mmap;

/// A memory-mapped LinoSPAD2 `.dat` acquisition file
pub struct DatFile {
    path: PathBuf,
    mmap_data: Option<Mmap>,
}

impl DatFile {
    /// Maps the file. Its contents are validated lazily by each operation.
    pub fn open(path: impl AsRef<Path>) -> UnpackResult<Self> {
        let path = path.as_ref();
        let mmap_data = read_binary_file_mmap(path)?;
        let file = Self {
            path: path.to_path_buf(),
            mmap_data,
        };
        debug!(path = %file.path.display(), bytes = file.len_bytes(), "opened acquisition file");
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        self.mmap_data.as_deref().unwrap_or(&[])
    }

    pub fn len_bytes(&self) -> usize {
        self.bytes().len()
    }

    /// Number of data words; `Format` if the file ends in a partial word
    pub fn word_count(&self) -> UnpackResult<usize> {
        word_count(self.bytes())
    }

    pub fn geometry(&self, timestamps_per_cycle: usize) -> UnpackResult<AcquisitionGeometry> {
        AcquisitionGeometry::builder()
            .word_count(self.word_count()?)
            .timestamps_per_cycle(timestamps_per_cycle)
            .build()
    }

    pub fn packets(&self) -> UnpackResult<impl Iterator<Item = Packet> + '_> {
        packets(self.bytes())
    }

    pub fn stats(&self) -> UnpackResult<StreamStats> {
        Ok(processing::scan_packets(self.packets()?))
    }

    pub fn unpack(&self, timestamps_per_cycle: usize) -> UnpackResult<TimestampMatrix> {
        processing::unpack(self.bytes(), timestamps_per_cycle)
    }

    pub fn unpack_calibrated(
        &self,
        timestamps_per_cycle: usize,
        calibration: &CalibrationTable,
    ) -> UnpackResult<TimestampMatrix> {
        processing::unpack_calibrated(self.bytes(), timestamps_per_cycle, calibration)
    }

    /// Loads the table for `board` from `source`, then unpacks with it.
    /// Fails with `CalibrationUnavailable` rather than falling back to
    /// uncorrected data.
    pub fn unpack_with_source<S: CalibrationSource + ?Sized>(
        &self,
        timestamps_per_cycle: usize,
        source: &S,
        board: &str,
    ) -> UnpackResult<TimestampMatrix> {
        let calibration = source.load(board)?;
        self.unpack_calibrated(timestamps_per_cycle, &calibration)
    }

    /// Get a summary of the file contents
    pub fn get_summary(&self, timestamps_per_cycle: usize) -> String {
        let mut result = String::new();
        result.push_str(&format!("File: {}\n", self.path.display()));
        result.push_str(&format!("  Size: {} bytes\n", self.len_bytes()));
        match self.geometry(timestamps_per_cycle) {
            Ok(geometry) => {
                result.push_str(&format!("  Words: {}\n", geometry.word_count));
                result.push_str(&format!(
                    "  Cycles: {} ({} timestamps per cycle)\n",
                    geometry.cycles, geometry.timestamps_per_cycle
                ));
                result.push_str(&format!(
                    "  Matrix: {} x {}\n",
                    geometry.pixels(),
                    geometry.columns()
                ));
            }
            Err(e) => result.push_str(&format!("  Layout: {e}\n")),
        }
        result
    }
}
