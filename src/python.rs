//! Python bindings (`python` feature)

use std::path::PathBuf;

use pyo3::exceptions::{PyFileNotFoundError, PyIOError, PyRuntimeError, PyValueError};
use pyo3::{
    Bound,
    PyErr,
    PyResult,
    Python,
    pyfunction,
    pymodule,
    types::PyModule,
    types::PyModuleMethods,
    wrap_pyfunction,
};

use crate::dat_file::DatFile;
use crate::error::UnpackError;
use crate::types::TimestampMatrix;
use crate::utils::CalibrationDir;

impl From<UnpackError> for PyErr {
    fn from(err: UnpackError) -> PyErr {
        match &err {
            UnpackError::Format { .. }
            | UnpackError::Geometry { .. }
            | UnpackError::InvalidCalibration(_) => PyValueError::new_err(err.to_string()),
            UnpackError::CalibrationUnavailable { .. } => {
                PyFileNotFoundError::new_err(err.to_string())
            }
            UnpackError::Io(_) => PyIOError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

fn into_rows(matrix: TimestampMatrix) -> Vec<Vec<f64>> {
    matrix.as_array().outer_iter().map(|row| row.to_vec()).collect()
}

/// Unpacks a `.dat` file into 256 rows of timestamps in ps (`-1` = no hit).
///
/// Args:
///     file_path (str): Path to the .dat file.
///     timestamps (int): Timestamps per pixel per acquisition cycle.
///
/// Raises:
///     ValueError: If the file size does not match the cycle layout.
#[pyfunction]
#[pyo3(signature = (file_path, timestamps = 512))]
fn unpack(py: Python<'_>, file_path: PathBuf, timestamps: usize) -> PyResult<Vec<Vec<f64>>> {
    let matrix = py.allow_threads(|| DatFile::open(&file_path)?.unpack(timestamps))?;
    Ok(into_rows(matrix))
}

/// Unpacks a `.dat` file and applies the board's TDC calibration.
///
/// Raises:
///     FileNotFoundError: If no calibration file exists for the board.
///     ValueError: If the data or calibration table is malformed.
#[pyfunction]
#[pyo3(signature = (file_path, board_number, calibration_dir, timestamps = 512))]
fn unpack_calib(
    py: Python<'_>,
    file_path: PathBuf,
    board_number: String,
    calibration_dir: PathBuf,
    timestamps: usize,
) -> PyResult<Vec<Vec<f64>>> {
    let matrix = py.allow_threads(|| {
        let source = CalibrationDir::new(calibration_dir);
        DatFile::open(&file_path)?.unpack_with_source(timestamps, &source, &board_number)
    })?;
    Ok(into_rows(matrix))
}

#[pymodule]
fn linospad(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(unpack, m)?)?;
    m.add_function(wrap_pyfunction!(unpack_calib, m)?)?;
    Ok(())
}
