//! Error types for unpacking LinoSPAD2 data
//!
//! The three data-level failures (`Format`, `Geometry`, `CalibrationUnavailable`)
//! are distinct variants so callers can react to each of them separately.
//! Nothing here is retried internally.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnpackError {
    /// Byte stream does not split into whole 32-bit words
    #[error("malformed stream: {len} bytes is not a whole number of 4-byte words ({trailing} trailing bytes)")]
    Format { len: u64, trailing: usize },

    /// Word count incompatible with the declared cycle layout
    #[error(
        "geometry mismatch: {words} words cannot be split into cycles of {timestamps_per_cycle} timestamps x {pixels} pixels"
    )]
    Geometry {
        words: usize,
        timestamps_per_cycle: usize,
        pixels: usize,
    },

    /// No calibration table could be obtained for the board
    #[error("no calibration data found for board '{board}' in {}", location.display())]
    CalibrationUnavailable { board: String, location: PathBuf },

    /// Calibration data was found but has the wrong shape or content
    #[error("invalid calibration table: {0}")]
    InvalidCalibration(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// TOML configuration could not be parsed
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// DataFrame read/write error
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl UnpackError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid calibration error
    pub fn invalid_calibration(msg: impl Into<String>) -> Self {
        Self::InvalidCalibration(msg.into())
    }

    /// Create a calibration-unavailable error
    pub fn calibration_unavailable(board: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self::CalibrationUnavailable {
            board: board.into(),
            location: location.into(),
        }
    }
}

pub type UnpackResult<T> = Result<T, UnpackError>;
