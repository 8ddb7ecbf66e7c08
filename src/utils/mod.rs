//! File mapping, calibration loading and export helpers

pub mod calibration_loader;
pub mod export;
pub mod file_utils;

// Re-export commonly used utility functions for convenience
pub use calibration_loader::{CalibrationDir, CalibrationSource, read_calibration_csv};
pub use export::{matrix_to_dataframe, write_matrix};
pub use file_utils::*;
