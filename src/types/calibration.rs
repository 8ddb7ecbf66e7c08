use ndarray::Array2;

use super::packet::constants::{BINS_PER_CLOCK, PIXEL_COUNT};
use crate::error::{UnpackError, UnpackResult};

/// Per-pixel, per-bin TDC correction offsets in picoseconds.
///
/// Always `PIXEL_COUNT x BINS_PER_CLOCK`; rows are pixels, columns are bins.
/// Offsets are tap positions inside one clock period, so they are never
/// negative and a corrected hit can never read as the `-1` sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    offsets: Array2<f64>,
}

impl CalibrationTable {
    pub fn from_array(offsets: Array2<f64>) -> UnpackResult<Self> {
        if offsets.dim() != (PIXEL_COUNT, BINS_PER_CLOCK) {
            return Err(UnpackError::invalid_calibration(format!(
                "expected {}x{} offsets, got {}x{}",
                PIXEL_COUNT,
                BINS_PER_CLOCK,
                offsets.nrows(),
                offsets.ncols()
            )));
        }
        if let Some(((pixel, bin), value)) = offsets.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(UnpackError::invalid_calibration(format!(
                "non-finite offset {value} at pixel {pixel}, bin {bin}"
            )));
        }
        if let Some(((pixel, bin), value)) = offsets.indexed_iter().find(|(_, v)| **v < 0.0) {
            return Err(UnpackError::invalid_calibration(format!(
                "negative offset {value} at pixel {pixel}, bin {bin}"
            )));
        }
        Ok(Self { offsets })
    }

    /// Row-major `PIXEL_COUNT * BINS_PER_CLOCK` values
    pub fn from_vec(offsets: Vec<f64>) -> UnpackResult<Self> {
        let len = offsets.len();
        let offsets = Array2::from_shape_vec((PIXEL_COUNT, BINS_PER_CLOCK), offsets).map_err(|_| {
            UnpackError::invalid_calibration(format!(
                "expected {} offsets, got {len}",
                PIXEL_COUNT * BINS_PER_CLOCK
            ))
        })?;
        Self::from_array(offsets)
    }

    /// Identity table: corrected times reduce to the coarse clock time
    pub fn zeros() -> Self {
        Self {
            offsets: Array2::zeros((PIXEL_COUNT, BINS_PER_CLOCK)),
        }
    }

    #[inline]
    pub fn offset(&self, pixel: usize, bin: usize) -> f64 {
        self.offsets[[pixel, bin]]
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.offsets
    }
}
