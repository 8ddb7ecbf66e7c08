//! Loading TDC calibration tables from CSV files

use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use ndarray::Array2;
use polars::prelude::*;
use tracing::{debug, warn};

use crate::error::{UnpackError, UnpackResult};
use crate::types::CalibrationTable;
use crate::types::packet::constants::{BINS_PER_CLOCK, PIXEL_COUNT};

/// Anything that can hand out a calibration table for a board
pub trait CalibrationSource {
    fn load(&self, board: &str) -> UnpackResult<CalibrationTable>;
}

/// A fixed table serves every board
impl CalibrationSource for CalibrationTable {
    fn load(&self, _board: &str) -> UnpackResult<CalibrationTable> {
        Ok(self.clone())
    }
}

/// Directory holding one `*TDC_<board>*.csv` file per board
#[derive(Debug, Clone)]
pub struct CalibrationDir {
    root: PathBuf,
}

impl CalibrationDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Finds the calibration file for `board`; the first match in name
    /// order wins when several files qualify.
    pub fn find_file(&self, board: &str) -> UnpackResult<PathBuf> {
        let unavailable = || UnpackError::calibration_unavailable(board, self.root.clone());
        let pattern = format!("TDC_{board}");

        let entries = fs::read_dir(&self.root).map_err(|e| {
            debug!(dir = %self.root.display(), error = %e, "calibration directory not readable");
            unavailable()
        })?;

        let candidates = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.contains(&pattern))
            })
            .sorted()
            .collect_vec();

        if candidates.len() > 1 {
            warn!(
                board,
                count = candidates.len(),
                chosen = %candidates[0].display(),
                "several calibration files match"
            );
        }
        candidates.into_iter().next().ok_or_else(unavailable)
    }
}

impl CalibrationSource for CalibrationDir {
    fn load(&self, board: &str) -> UnpackResult<CalibrationTable> {
        let path = self.find_file(board)?;
        debug!(board, path = %path.display(), "loading calibration table");
        read_calibration_csv(&path)
    }
}

/// Reads a calibration CSV: a header row, then one row per pixel with 140
/// bin offsets, optionally preceded by a pixel index column.
pub fn read_calibration_csv(path: impl AsRef<Path>) -> UnpackResult<CalibrationTable> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;
    table_from_dataframe(&df)
}

pub fn table_from_dataframe(df: &DataFrame) -> UnpackResult<CalibrationTable> {
    let (rows, width) = df.shape();
    let skip = if width == BINS_PER_CLOCK {
        0
    } else if width == BINS_PER_CLOCK + 1 {
        1
    } else {
        return Err(UnpackError::invalid_calibration(format!(
            "expected {} or {} columns, got {width}",
            BINS_PER_CLOCK,
            BINS_PER_CLOCK + 1
        )));
    };
    if rows != PIXEL_COUNT {
        return Err(UnpackError::invalid_calibration(format!(
            "expected {PIXEL_COUNT} pixel rows, got {rows}"
        )));
    }

    let bins = df.get_columns()[skip..]
        .iter()
        .map(|column| {
            let series = column.as_materialized_series().cast(&DataType::Float64)?;
            let values = series.f64()?;
            if values.null_count() > 0 {
                return Err(UnpackError::invalid_calibration(format!(
                    "column '{}' has empty or non-numeric cells",
                    column.name()
                )));
            }
            Ok(values.into_no_null_iter().collect_vec())
        })
        .collect::<UnpackResult<Vec<Vec<f64>>>>()?;

    let offsets =
        Array2::from_shape_fn((PIXEL_COUNT, BINS_PER_CLOCK), |(pixel, bin)| bins[bin][pixel]);
    CalibrationTable::from_array(offsets)
}
