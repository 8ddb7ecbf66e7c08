use ndarray::parallel::prelude::*;
use ndarray::{Array2, Axis};

use crate::error::{UnpackError, UnpackResult};
use crate::types::CalibrationTable;
use crate::types::packet::constants::{BIN_WIDTH_PS, BINS_PER_CLOCK, PIXEL_COUNT};

/// Applies the per-pixel, per-bin TDC correction to raw bin counts.
///
/// A raw count `v` splits into the coarse part `v - v % 140` (whole clock
/// periods, scaled by the average bin width) and the fine bin `v % 140`,
/// whose position inside the clock period comes from the calibration table.
pub struct CalibrationCorrector<'a> {
    table: &'a CalibrationTable,
}

impl<'a> CalibrationCorrector<'a> {
    pub fn new(table: &'a CalibrationTable) -> Self {
        Self { table }
    }

    /// Corrected time in ps for one valid raw count
    #[inline]
    pub fn correct(&self, pixel: usize, raw_count: u64) -> f64 {
        let bin = raw_count % BINS_PER_CLOCK as u64;
        let coarse = raw_count - bin;
        coarse as f64 * BIN_WIDTH_PS + self.table.offset(pixel, bin as usize)
    }

    /// Corrects a reshaped raw-count matrix in place.
    ///
    /// Negative cells (the `-1` empty-slot marker) are never touched.
    pub fn apply(&self, matrix: &mut Array2<f64>) -> UnpackResult<()> {
        if matrix.nrows() != PIXEL_COUNT {
            return Err(UnpackError::Geometry {
                words: matrix.len(),
                timestamps_per_cycle: matrix.ncols(),
                pixels: PIXEL_COUNT,
            });
        }

        matrix
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(pixel, mut row)| {
                for value in row.iter_mut().filter(|v| **v >= 0.0) {
                    *value = self.correct(pixel, *value as u64);
                }
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_table() -> CalibrationTable {
        // offset = bin * 17.0 + pixel * 0.5
        let offsets = Array2::from_shape_fn((PIXEL_COUNT, BINS_PER_CLOCK), |(p, b)| {
            b as f64 * 17.0 + p as f64 * 0.5
        });
        CalibrationTable::from_array(offsets).unwrap()
    }

    #[test]
    fn test_identity_table_keeps_coarse_time() {
        let table = CalibrationTable::zeros();
        let corrector = CalibrationCorrector::new(&table);
        assert_eq!(corrector.correct(0, 1), 0.0);
        assert_eq!(corrector.correct(0, 140), 140.0 * 17.857);
        assert_eq!(corrector.correct(0, 281), 280.0 * 17.857);
    }

    #[test]
    fn test_correction_formula() {
        let table = ramp_table();
        let corrector = CalibrationCorrector::new(&table);
        // 1000 = 7 * 140 + 20
        let expected = 980.0 * 17.857 + (20.0 * 17.0 + 3.0 * 0.5);
        assert_eq!(corrector.correct(3, 1000), expected);
    }

    #[test]
    fn test_apply_skips_sentinel() {
        let table = ramp_table();
        let mut matrix = Array2::from_elem((PIXEL_COUNT, 4), -1.0);
        matrix[[0, 0]] = 1.0;
        matrix[[10, 3]] = 0.0;
        matrix[[255, 2]] = 141.0;

        CalibrationCorrector::new(&table).apply(&mut matrix).unwrap();

        assert_eq!(matrix[[0, 0]], 17.0);
        assert_eq!(matrix[[10, 3]], 5.0);
        assert_eq!(matrix[[255, 2]], 140.0 * 17.857 + 144.5);
        let sentinels = matrix.iter().filter(|&&v| v == -1.0).count();
        assert_eq!(sentinels, PIXEL_COUNT * 4 - 3);
    }

    #[test]
    fn test_apply_rejects_wrong_row_count() {
        let table = CalibrationTable::zeros();
        let mut matrix = Array2::from_elem((16, 4), -1.0);
        assert!(CalibrationCorrector::new(&table).apply(&mut matrix).is_err());
    }
}
